/// Session-lifetime list of triggered alert lines, oldest first.
#[derive(Debug, Default)]
pub struct AlertLog {
    records: Vec<String>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: String) {
        self.records.push(message);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
