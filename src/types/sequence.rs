use super::error::RuleError;
use super::rule::CompiledRule;

/// The editable row of display blocks behind the rule editor.
///
/// Blocks are stored exactly as shown; mapping to internal values happens at
/// compile time.
///
/// # Example
///
/// ```
/// use sortie_plan::BlockSequence;
///
/// let rule = BlockSequence::new()
///     .block("战列")
///     .block("+")
///     .block("轻巡")
///     .block(">")
///     .block("1")
///     .compile()
///     .unwrap();
/// assert_eq!(rule.condition, "BB + CL > 1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSequence {
    blocks: Vec<String>,
}

impl BlockSequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a stored condition for editing, rendered as display blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`](crate::ParseError) if the condition cannot be
    /// split into tokens.
    pub fn from_condition(condition: &str) -> Result<Self, crate::ParseError> {
        Ok(Self {
            blocks: crate::compile::display_blocks(condition)?,
        })
    }

    #[must_use]
    pub fn block(mut self, block: &str) -> Self {
        self.blocks.push(block.to_owned());
        self
    }

    pub fn push(&mut self, block: &str) {
        self.blocks.push(block.to_owned());
    }

    /// Insert at `index`, clamped to the end of the row.
    pub fn insert(&mut self, index: usize, block: &str) {
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block.to_owned());
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.blocks.len()).then(|| self.blocks.remove(index))
    }

    /// Move the block at `from` so it ends up at `to`. Returns `false` when
    /// either index is out of range.
    pub fn move_block(&mut self, from: usize, to: usize) -> bool {
        if from >= self.blocks.len() || to >= self.blocks.len() {
            return false;
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        true
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    #[must_use]
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`RuleError`] if the row does not form a valid rule.
    pub fn compile(&self) -> Result<CompiledRule, RuleError> {
        crate::compile::compile_rule(&self.blocks)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        crate::compile::validate_rule(&self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_compiles() {
        let seq = BlockSequence::new().block("潜艇").block("=").block("0");
        assert!(seq.is_valid());
        assert_eq!(seq.compile().unwrap().condition, "SS == 0");
    }

    #[test]
    fn editing_changes_validity() {
        let mut seq = BlockSequence::new().block("BB").block(">");
        assert!(!seq.is_valid());
        seq.push("1");
        assert!(seq.is_valid());
        seq.insert(1, "CL");
        assert!(!seq.is_valid());
        seq.insert(1, "+");
        assert!(seq.is_valid());
        assert_eq!(seq.remove(2).as_deref(), Some("CL"));
        assert!(!seq.is_valid());
    }

    #[test]
    fn insert_past_end_appends() {
        let mut seq = BlockSequence::new().block("BB");
        seq.insert(10, ">");
        assert_eq!(seq.blocks(), ["BB", ">"]);
    }

    #[test]
    fn move_block_reorders() {
        let mut seq = BlockSequence::new().block("1").block("BB").block(">");
        assert!(seq.move_block(0, 2));
        assert_eq!(seq.blocks(), ["BB", ">", "1"]);
        assert!(!seq.move_block(0, 3));
    }

    #[test]
    fn from_condition_round_trips() {
        let seq = BlockSequence::new()
            .block("(")
            .block("航母")
            .block(">")
            .block("0")
            .block(")")
            .block("或者")
            .block("驱逐")
            .block("≤")
            .block("2");
        let stored = seq.compile().unwrap().condition;
        let reloaded = BlockSequence::from_condition(&stored).unwrap();
        assert_eq!(reloaded, seq);
    }

    #[test]
    fn clear_empties_row() {
        let mut seq = BlockSequence::new().block("BB");
        seq.clear();
        assert!(seq.is_empty());
        assert!(!seq.is_valid());
    }
}
