//! # formkit-form: Form Runtime
//!
//! Everything around the validator that a host application drives:
//!
//! - **Rendering dispatch** (`render.rs`): maps each field to exactly one
//!   widget view model. The `match` over `Field` is total; there is no
//!   fallback widget.
//!
//! - **Interaction state** (`state.rs`): current values pre-filled from
//!   field defaults, dirty and touched tracking, per-field errors, and
//!   array item insertion, removal, and reordering.
//!
//! - **Submission lifecycle** (`session.rs`): validate, run the optional
//!   whole-record `on_validate` gate, hand the record to the caller's
//!   submit handler, then reset. One submission at a time.
//!
//! ## Crate Policy
//!
//! - Holds no validation logic of its own. Every accept/reject decision
//!   comes from `formkit-schema`.
//! - Callback failures are caught at the session boundary and reported
//!   through `on_error`; they never propagate to the caller as panics.

pub mod render;
pub mod session;
pub mod state;

pub use render::{
    password_strength, strength_label, widget_for, ArrayItem, ArrayWidget, ButtonState,
    EmailWidget, FieldFrame, FormView, InputAttrs, NumberWidget, PasswordWidget, Strength,
    StrengthLevel, TextWidget, Widget,
};
pub use session::{FormCallbacks, FormSession, SubmitHandler, SubmitOutcome};
pub use state::{FormState, StateError};
