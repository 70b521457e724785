//! Bidirectional `<bom>` XML wire format.
//!
//! The writer emits the persisted artifact:
//!
//! ```xml
//! <bom>
//!   <assembly>
//!     <name>...</name>
//!     <part>
//!       <name>...</name>
//!       <sku>...</sku>
//!       <quantity>1</quantity>
//!       <cost>8.99</cost>
//!       <compatibility>
//!         <rule>...</rule>
//!       </compatibility>
//!     </part>
//!   </assembly>
//! </bom>
//! ```
//!
//! The reader accepts any well-formed document with a `bom` root and rebuilds
//! a fully detached tree, so a parse failure never leaves a half-applied
//! model behind.

mod reader;
mod writer;

pub use reader::from_xml;
pub use writer::{to_xml, to_xml_document, XML_DECLARATION};
