//! The contract dispatched values have to satisfy.

/// An action describes an intent to change state.
///
/// Actions are compared structurally (`PartialEq`) when the enhancer
/// deduplicates a pending batch, so two actions with equal payloads count as
/// the same action regardless of where they were emitted.
///
/// `kind` is a stable identifier for the action variant. It is what the
/// start-kind suspension and the log callback match on. For enums this is
/// usually the variant name; deriving `strum::IntoStaticStr` keeps it in sync:
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
/// enum JobAction {
///     Submit { id: u64 },
///     Run,
/// }
///
/// impl Action for JobAction {
///     fn kind(&self) -> &str {
///         self.into()
///     }
/// }
/// ```
pub trait Action: Clone + PartialEq + Send + 'static {
    /// Stable identifier for this action's variant.
    fn kind(&self) -> &str;
}
