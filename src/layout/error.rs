/// Why a layout run produced no positions.
///
/// [`super::LayoutEngine::layout`] swallows these and keeps the input
/// positions; [`super::LayoutEngine::try_layout`] returns them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout provider failed: {0}")]
    Provider(String),
    #[error("layout provider panicked")]
    ProviderPanicked,
    #[error("layout provider returned no position for node {0}")]
    MissingPosition(String),
    #[error("layout provider returned a non-finite position for node {0}")]
    NonFinitePosition(String),
}
