//! Class-id to display-name lookup.

use std::collections::HashMap;

/// Sparse class-id → display-name table supplied at init.
///
/// Any subset of ids may be present; missing entries render as
/// `"Class <id>"`.
#[derive(Debug, Clone, Default)]
pub struct ClassLabels {
    names: HashMap<i32, String>,
}

impl ClassLabels {
    pub fn new(names: HashMap<i32, String>) -> Self {
        Self { names }
    }

    /// The stored name for `id`, if any.
    pub fn name(&self, id: i32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Display string for `id`, with the `"Class <id>"` fallback.
    pub fn display(&self, id: i32) -> String {
        match self.names.get(&id) {
            Some(name) => format!("{} - {}", id, name),
            None => format!("Class {}", id),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_known_and_fallback() {
        let mut names = HashMap::new();
        names.insert(3, "cat".to_string());
        let labels = ClassLabels::new(names);

        assert_eq!(labels.display(3), "3 - cat");
        assert_eq!(labels.display(17), "Class 17");
        assert_eq!(labels.name(17), None);
    }
}
