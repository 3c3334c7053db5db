use flv::PrevTagSizeMode;

/// How recoverable damage found while parsing is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Drop a second metadata tag and truncate at trailing corruption,
    /// logging a warning for each.
    #[default]
    Permissive,
    /// Fail with `FlvError::DuplicateMetadata` / `FlvError::Truncated`.
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct FlvFixConfig {
    pub strictness: Strictness,
    /// Validation of the `PreviousTagSize` fields of the source.
    pub prev_tag_size_mode: PrevTagSizeMode,
}

impl FlvFixConfig {
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
            prev_tag_size_mode: PrevTagSizeMode::Strict,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }
}
