use serde::Serialize;

/// Budget applied when nothing else is configured.
pub const DEFAULT_MAX_TOKENS: usize = 8000;

/// Approximate token count: one token per three bytes, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.len().div_ceil(3)
}

/// Split of the model context between diff content and everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenBudget {
    pub max_tokens: usize,
    /// Kept back for the instructions and metadata sections.
    pub reserved_tokens: usize,
    pub available_tokens: usize,
}

impl TokenBudget {
    /// Reserve a quarter of `max_tokens`, rounded down.
    pub fn new(max_tokens: usize) -> Self {
        let reserved_tokens = max_tokens / 4;
        TokenBudget {
            max_tokens,
            reserved_tokens,
            available_tokens: max_tokens - reserved_tokens,
        }
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        TokenBudget::new(DEFAULT_MAX_TOKENS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(300)), 100);
    }

    #[test]
    fn quarter_is_reserved() {
        let budget = TokenBudget::new(4000);
        assert_eq!(budget.reserved_tokens, 1000);
        assert_eq!(budget.available_tokens, 3000);

        let budget = TokenBudget::default();
        assert_eq!(budget.max_tokens, 8000);
        assert_eq!(budget.reserved_tokens, 2000);
        assert_eq!(budget.available_tokens, 6000);
    }

    #[test]
    fn tiny_budgets_reserve_nothing() {
        let budget = TokenBudget::new(3);
        assert_eq!(budget.reserved_tokens, 0);
        assert_eq!(budget.available_tokens, 3);
    }
}
