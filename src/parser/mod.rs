/*!
# Fortran Definitions Parser

Line-oriented reading of free-form Fortran sources: comment and
continuation handling, literal classification and `type :: names`
declarations. No expression grammar is involved; everything works on
physical and reassembled logical lines.
*/

pub mod declarations;
pub mod lines;
pub mod literal;
pub mod patterns;

pub use declarations::{declared_names, dtype_of, parse_declarations, DeclaredName};
pub use lines::{collect_logical_lines, full_line, CleanedSource, LogicalLine, LogicalLines, ReassemblyOptions};
pub use literal::{classify_literal, parse_real, Classification};
