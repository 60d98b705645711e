//! Knobs for how strictly cartridge images are loaded

/// What to do with a GB/GBC cartridge type byte that has no mapper here
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UnknownCartTypePolicy {
    /// Refuse to load the image
    Reject,
    /// Load the image with the fixed mapper and no cartridge capabilities
    ///
    /// Games that never bank-switch will run. Anything else will misbehave.
    FallbackToBase,
}

impl Default for UnknownCartTypePolicy {
    fn default() -> Self {
        UnknownCartTypePolicy::Reject
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct LoadOptions {
    pub unknown_cart_type: UnknownCartTypePolicy,
}

impl LoadOptions {
    /// Options that fall back to the fixed mapper instead of failing
    pub fn lenient() -> LoadOptions {
        LoadOptions {
            unknown_cart_type: UnknownCartTypePolicy::FallbackToBase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_reject_by_default() {
        assert_eq!(
            LoadOptions::default().unknown_cart_type,
            UnknownCartTypePolicy::Reject
        );
        assert_eq!(
            LoadOptions::lenient().unknown_cart_type,
            UnknownCartTypePolicy::FallbackToBase
        );
    }
}
