/// Declare the queryable field enum of an entity.
///
/// Each variant is paired with its public name, which doubles as the sort
/// key accepted from callers and the column name in storage.
macro_rules! entity_fields {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::specification::Field for $name {
            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            fn all() -> &'static [Self] {
                &[$($name::$variant),+]
            }
        }
    };
}
