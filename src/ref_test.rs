// Reference model for RbTree: a sorted vector of every inserted value,
// duplicates included.
struct RefValues {
    values: Vec<i64>,
}

impl RefValues {
    fn new(capacity: usize) -> RefValues {
        RefValues {
            values: Vec::with_capacity(capacity),
        }
    }

    fn insert(&mut self, value: i64) {
        // equal values go after the existing ones, like the tree does.
        let off = self.values.iter().take_while(|v| **v <= value).count();
        self.values.insert(off, value);
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn iter(&self) -> std::vec::IntoIter<i64> {
        self.values.clone().into_iter()
    }
}
