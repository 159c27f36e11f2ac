//! Best-effort classification of declared Java type strings.
//!
//! The metadata's `type` strings are free-form (generics, arrays, `$` nested
//! classes). Full type resolution belongs to a host type system; the index
//! only needs to know whether a property binds a scalar, a collection, or a
//! map. Hosts with a real type system plug in their own [`TypeShapeResolver`].

/// Scalar kinds the binder understands well enough for value checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    Boolean,
    Integer,
    Float,
    String,
    Enum,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeShape {
    Scalar(ScalarKind),
    Collection,
    Map,
    Unknown,
}

impl TypeShape {
    #[must_use]
    pub fn is_map(self) -> bool {
        matches!(self, TypeShape::Map)
    }

    #[must_use]
    pub fn is_collection(self) -> bool {
        matches!(self, TypeShape::Collection)
    }

    #[must_use]
    pub fn is_value_type(self) -> bool {
        matches!(self, TypeShape::Scalar(_))
    }
}

/// Maps an opaque declared-type string to a [`TypeShape`].
pub trait TypeShapeResolver {
    fn shape(&self, ty: &str) -> TypeShape;
}

/// String-inspection fallback used when no host type system is available.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultShapeResolver;

impl TypeShapeResolver for DefaultShapeResolver {
    fn shape(&self, ty: &str) -> TypeShape {
        // `A$B` is how the processor spells nested classes; normalize before
        // matching raw class names.
        let ty = ty.replace('$', ".");
        let base = ty.split('<').next().unwrap_or(&ty).trim();

        if base.ends_with("[]") {
            return TypeShape::Collection;
        }
        match base {
            "java.util.Map"
            | "java.util.HashMap"
            | "java.util.LinkedHashMap"
            | "java.util.TreeMap"
            | "java.util.SortedMap"
            | "java.util.concurrent.ConcurrentHashMap"
            | "java.util.Properties" => TypeShape::Map,
            "java.util.List"
            | "java.util.ArrayList"
            | "java.util.LinkedList"
            | "java.util.Set"
            | "java.util.HashSet"
            | "java.util.LinkedHashSet"
            | "java.util.TreeSet"
            | "java.util.SortedSet"
            | "java.util.Collection" => TypeShape::Collection,
            "boolean" | "java.lang.Boolean" => TypeShape::Scalar(ScalarKind::Boolean),
            "byte" | "short" | "int" | "long" | "java.lang.Byte" | "java.lang.Short"
            | "java.lang.Integer" | "java.lang.Long" => TypeShape::Scalar(ScalarKind::Integer),
            "float" | "double" | "java.lang.Float" | "java.lang.Double" => {
                TypeShape::Scalar(ScalarKind::Float)
            }
            "java.lang.String" | "java.lang.CharSequence" => TypeShape::Scalar(ScalarKind::String),
            "char" | "java.lang.Character" | "java.time.Duration" | "java.time.Period"
            | "java.nio.charset.Charset" | "java.util.Locale" | "java.net.URI"
            | "java.net.URL" | "java.io.File" | "java.nio.file.Path"
            | "org.springframework.util.unit.DataSize" => TypeShape::Scalar(ScalarKind::Other),
            _ => TypeShape::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_common_declared_types() {
        let resolver = DefaultShapeResolver;
        assert_eq!(
            resolver.shape("java.util.Map<java.lang.String,java.lang.String>"),
            TypeShape::Map
        );
        assert_eq!(
            resolver.shape("java.util.List<java.lang.String>"),
            TypeShape::Collection
        );
        assert_eq!(resolver.shape("java.lang.String[]"), TypeShape::Collection);
        assert_eq!(
            resolver.shape("java.lang.Integer"),
            TypeShape::Scalar(ScalarKind::Integer)
        );
        assert_eq!(
            resolver.shape("boolean"),
            TypeShape::Scalar(ScalarKind::Boolean)
        );
        assert_eq!(
            resolver.shape("com.example.Custom$Nested"),
            TypeShape::Unknown
        );
    }
}
