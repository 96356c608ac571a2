//! Source front ends
//!
//! Kotlin goes through tree-sitter, resource XML through quick-xml, and Gradle
//! files are only scanned for dependency coordinates.

pub mod gradle;
pub mod kotlin;
pub mod symbols;
pub mod xml;

pub use kotlin::{FileOutline, KotlinParser};
pub use symbols::{ClassHeader, Imports, SymbolTable};
pub use xml::{parse_resource, parse_resource_file, ResourceDocument, ResourceFolderType};
