//! The tutoring turn: from a validated request to a committed exchange.
//!
//! A turn follows a fixed **Assemble → Complete → Commit** sequence:
//!
//! 1. **Receive** a chat request (prompt, level, optional document, session id)
//! 2. **Assemble** the provider prompt (level system prompt + history + turn)
//! 3. **Send to LLM** via the configured provider, exactly once
//! 4. **Commit** the exchange and any file annotations to the session
//!
//! Nothing is written to the session unless step 3 succeeds.

pub mod assembler;
pub mod tutor;

pub use assembler::{AssembledPrompt, AssemblyInput, TurnKind, assemble};
pub use tutor::{ChatReply, ChatTurn, MISSING_FIELDS_MESSAGE, Tutor};
