//! Chess rules for Rookline.
//!
//! Both halves of the system consult the same rules: the authority to
//! validate and apply move intents, clients to classify the positions the
//! authority sends them. Legal-move generation is delegated to
//! `cozy-chess`; this crate owns the value types that travel on the wire
//! and the [`RulesEngine`] seam the authority and client are generic over.
//!
//! ```text
//! MoveIntent ──→ RulesEngine::apply ──→ Position ──→ RulesEngine::assess ──→ Assessment
//! ```

mod assessment;
mod engine;
mod error;
mod position;
mod types;

pub use assessment::{Assessment, Terminal};
pub use engine::{RulesEngine, StandardRules};
pub use error::RulesError;
pub use position::{Grid, Position};
pub use types::{Color, MoveIntent, Piece, PieceKind, Square};
