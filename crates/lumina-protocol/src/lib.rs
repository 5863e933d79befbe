//! Tagged-text change protocol.
//!
//! AI output wraps file operations in a `<response>` container:
//!
//! ```text
//! <response>
//!     <thinking>...</thinking>
//!     <changes>
//!         <change>
//!             <file>App.tsx</file>
//!             <action>create</action>
//!             <description>...</description>
//!             <content><![CDATA[ ...verbatim... ]]></content>
//!         </change>
//!     </changes>
//!     <message>...</message>
//! </response>
//! ```
//!
//! [`parse_response`] reads a finished response; [`IncrementalParser`] applies
//! create/update blocks to the store while the response is still streaming.

pub mod apply;
pub mod change;
pub mod deps;
pub mod error;
pub mod incremental;
pub mod parser;
pub mod patch;
pub mod prompt;
mod scan;

pub use apply::{apply_changes, AppliedAction, AppliedChange};
pub use change::{ChangeAction, ChangeBlock, ParsedResponse, Patch};
pub use deps::detect_dependencies;
pub use error::ApplyError;
pub use incremental::IncrementalParser;
pub use parser::{extract_changes, parse_response};
pub use patch::{apply_patches, patch_file, PatchOutcome};
pub use prompt::build_system_prompt;
