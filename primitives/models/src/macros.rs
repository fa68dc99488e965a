/// Declares a wire enum together with its static schema and typed views.
///
/// ```ignore
/// wire_enum! {
///     /// Lifecycle of an order.
///     pub enum OrderStatus("OrderStatus") {
///         /// Not yet confirmed
///         Draft => Str("draft"),
///     }
/// }
/// ```
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident($wire_name:literal) {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $kind:ident($literal:expr)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl schema::WireEnum for $name {
            fn schema() -> &'static schema::EnumSchema {
                static SCHEMA: schema::EnumSchema = schema::EnumSchema::new(
                    $wire_name,
                    &[$(schema::WireLiteral::$kind($literal)),+],
                );
                &SCHEMA
            }

            fn from_literal(literal: schema::WireLiteral) -> Option<Self> {
                $(
                    if literal == schema::WireLiteral::$kind($literal) {
                        return Some($name::$variant);
                    }
                )+
                None
            }

            fn literal(&self) -> schema::WireLiteral {
                match self {
                    $($name::$variant => schema::WireLiteral::$kind($literal),)+
                }
            }
        }

        impl $name {
            /// Converter for this enum.
            pub fn converter() -> schema::Converter {
                schema::Converter::Enum(<$name as schema::WireEnum>::schema())
            }
        }

        impl schema::FromTyped for $name {
            fn from_typed(value: &schema::Typed) -> Option<Self> {
                match value {
                    schema::Typed::Enum(member) => <$name as schema::WireEnum>::from_member(member),
                    _ => None,
                }
            }
        }

        impl schema::IntoTyped for $name {
            fn to_typed(&self) -> schema::Typed {
                schema::Typed::Enum(schema::WireEnum::member(self))
            }
        }
    };
}

/// Implements the typed views of a generated model so it can be nested in
/// other models, lists and maps.
macro_rules! model_views {
    ($($model:ident),+ $(,)?) => {
        $(
            impl schema::FromTyped for $model {
                fn from_typed(value: &schema::Typed) -> Option<Self> {
                    let instance = value.as_model()?;
                    if instance.name() != registry::model_schema::<$model>().name {
                        return None;
                    }
                    Some(<$model as schema::Model>::from_instance(instance))
                }
            }

            impl schema::IntoTyped for $model {
                fn to_typed(&self) -> schema::Typed {
                    schema::Typed::Model(<$model as schema::Model>::to_instance(self))
                }
            }
        )+
    };
}
