//! Conversions between the name forms a class goes by.
//!
//! Descriptors are stored under their *internal* name (`java/lang/String`,
//! `[I`, `[Ljava/lang/Object;`, and the keyword for primitives). Guest code
//! sees the *binary* name returned by `Class.getName()` (`java.lang.String`,
//! `[I`, `[Ljava.lang.Object;`).

/// Primitive keywords paired with their descriptor characters.
pub const PRIMITIVES: [(&str, char); 9] = [
    ("void", 'V'),
    ("boolean", 'Z'),
    ("byte", 'B'),
    ("char", 'C'),
    ("short", 'S'),
    ("int", 'I'),
    ("long", 'J'),
    ("float", 'F'),
    ("double", 'D'),
];

/// Separator between an enclosing class name and a member class name.
pub const NESTED_CLASS_SEPARATOR: char = '$';

pub fn is_primitive_name(name: &str) -> bool {
    PRIMITIVES.iter().any(|(keyword, _)| *keyword == name)
}

pub fn primitive_descriptor(keyword: &str) -> Option<char> {
    PRIMITIVES
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, d)| *d)
}

pub fn primitive_keyword(descriptor: char) -> Option<&'static str> {
    PRIMITIVES
        .iter()
        .find(|(_, d)| *d == descriptor)
        .map(|(k, _)| *k)
}

pub fn is_array_name(name: &str) -> bool {
    name.starts_with('[')
}

pub fn to_internal_name(name: &str) -> String {
    name.replace('.', "/")
}

pub fn to_binary_name(name: &str) -> String {
    name.replace('/', ".")
}

/// Name of the array class whose elements are `component`.
pub fn array_class_name(component: &str) -> String {
    if is_array_name(component) {
        format!("[{component}")
    } else if let Some(d) = primitive_descriptor(component) {
        format!("[{d}")
    } else {
        format!("[L{component};")
    }
}

/// Name of the component class of the array class `name`, or `None` if
/// `name` is not a well-formed array class name.
pub fn component_class_name(name: &str) -> Option<String> {
    let rest = name.strip_prefix('[')?;
    if rest.starts_with('[') {
        return Some(rest.to_string());
    }
    if let Some(class) = rest.strip_prefix('L') {
        let class = class.strip_suffix(';')?;
        if class.is_empty() {
            return None;
        }
        return Some(class.to_string());
    }
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        // `void[]` does not exist
        (Some('V'), _) => None,
        (Some(c), None) => primitive_keyword(c).map(str::to_string),
        _ => None,
    }
}

/// The enclosing class named by the prefix before the last `$`.
pub fn declaring_class_name(name: &str) -> Option<&str> {
    name.rfind(NESTED_CLASS_SEPARATOR).map(|i| &name[..i])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_names() {
        assert_eq!(array_class_name("int"), "[I");
        assert_eq!(array_class_name("[I"), "[[I");
        assert_eq!(array_class_name("java/lang/String"), "[Ljava/lang/String;");
        assert_eq!(array_class_name("[Ljava/lang/String;"), "[[Ljava/lang/String;");
    }

    #[test]
    fn test_component_names() {
        assert_eq!(component_class_name("[I").as_deref(), Some("int"));
        assert_eq!(component_class_name("[[J").as_deref(), Some("[J"));
        assert_eq!(
            component_class_name("[Ljava/lang/Object;").as_deref(),
            Some("java/lang/Object")
        );
        assert_eq!(component_class_name("java/lang/Object"), None);
        assert_eq!(component_class_name("[V"), None);
        assert_eq!(component_class_name("[L;"), None);
        assert_eq!(component_class_name("[Ljava/lang/Object"), None);
        assert_eq!(component_class_name("[II"), None);
    }

    #[test]
    fn test_binary_names() {
        assert_eq!(to_binary_name("java/util/Map$Entry"), "java.util.Map$Entry");
        assert_eq!(to_binary_name("[Ljava/lang/String;"), "[Ljava.lang.String;");
        assert_eq!(to_internal_name("java.lang.String"), "java/lang/String");
    }

    #[test]
    fn test_declaring_class_name() {
        assert_eq!(declaring_class_name("a/Outer$Inner"), Some("a/Outer"));
        assert_eq!(declaring_class_name("a/Outer$Mid$Inner"), Some("a/Outer$Mid"));
        assert_eq!(declaring_class_name("a/Outer"), None);
    }

    #[test]
    fn test_primitive_table() {
        assert!(is_primitive_name("int"));
        assert!(!is_primitive_name("Integer"));
        assert_eq!(primitive_descriptor("boolean"), Some('Z'));
        assert_eq!(primitive_keyword('J'), Some("long"));
        assert_eq!(primitive_keyword('L'), None);
    }
}
