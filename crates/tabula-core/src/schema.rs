mod field_type;
pub use field_type::FieldType;

mod name;
pub use name::{canonical_name, factory_key, is_valid_table_name, table_name};

mod relation;
pub use relation::{RelationKind, RelationOptions};
