use crate::error::VmError;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object(String),
    Array(Box<FieldType>),
}

/// Calling-convention category of a parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    Void,
    Int,
    Long,
    Float,
    Double,
    Reference,
}

impl FieldType {
    pub fn category(&self) -> ValueCategory {
        match self {
            FieldType::Boolean
            | FieldType::Byte
            | FieldType::Char
            | FieldType::Short
            | FieldType::Int => ValueCategory::Int,
            FieldType::Long => ValueCategory::Long,
            FieldType::Float => ValueCategory::Float,
            FieldType::Double => ValueCategory::Double,
            FieldType::Object(_) | FieldType::Array(_) => ValueCategory::Reference,
        }
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Boolean => write!(f, "Z"),
            FieldType::Byte => write!(f, "B"),
            FieldType::Char => write!(f, "C"),
            FieldType::Short => write!(f, "S"),
            FieldType::Int => write!(f, "I"),
            FieldType::Long => write!(f, "J"),
            FieldType::Float => write!(f, "F"),
            FieldType::Double => write!(f, "D"),
            FieldType::Object(name) => write!(f, "L{name};"),
            FieldType::Array(component) => write!(f, "[{component}"),
        }
    }
}

/// A parsed method descriptor (JVMS §4.3.3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    /// `None` for `V`.
    pub return_type: Option<FieldType>,
}

impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self, VmError> {
        let malformed = |reason: &str| VmError::MalformedDescriptor {
            descriptor: descriptor.to_string(),
            reason: reason.to_string(),
        };

        let rest = descriptor
            .strip_prefix('(')
            .ok_or_else(|| malformed("missing '('"))?;
        let close = rest.find(')').ok_or_else(|| malformed("missing ')'"))?;
        let (mut params, ret) = (&rest[..close], &rest[close + 1..]);

        let mut parameters = vec![];
        while !params.is_empty() {
            let (t, tail) = parse_field_type(params).ok_or_else(|| malformed("bad parameter"))?;
            parameters.push(t);
            params = tail;
        }

        let return_type = if ret == "V" {
            None
        } else {
            match parse_field_type(ret) {
                Some((t, "")) => Some(t),
                Some(_) => return Err(malformed("trailing characters after return type")),
                None => return Err(malformed("bad return type")),
            }
        };

        Ok(Self {
            parameters,
            return_type,
        })
    }

    pub fn return_category(&self) -> ValueCategory {
        self.return_type
            .as_ref()
            .map_or(ValueCategory::Void, FieldType::category)
    }

    /// Number of values a completed call leaves on the operand stack.
    pub fn result_count(&self) -> usize {
        usize::from(self.return_type.is_some())
    }
}

impl Display for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for p in &self.parameters {
            write!(f, "{p}")?;
        }
        write!(f, ")")?;
        match &self.return_type {
            Some(t) => write!(f, "{t}"),
            None => write!(f, "V"),
        }
    }
}

fn parse_field_type(s: &str) -> Option<(FieldType, &str)> {
    let mut chars = s.chars();
    let t = match chars.next()? {
        'Z' => FieldType::Boolean,
        'B' => FieldType::Byte,
        'C' => FieldType::Char,
        'S' => FieldType::Short,
        'I' => FieldType::Int,
        'J' => FieldType::Long,
        'F' => FieldType::Float,
        'D' => FieldType::Double,
        'L' => {
            let end = s.find(';')?;
            let name = &s[1..end];
            if name.is_empty() {
                return None;
            }
            return Some((FieldType::Object(name.to_string()), &s[end + 1..]));
        }
        '[' => {
            let (component, tail) = parse_field_type(&s[1..])?;
            return Some((FieldType::Array(Box::new(component)), tail));
        }
        _ => return None,
    };
    Some((t, chars.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_class_natives() {
        let d = MethodDescriptor::parse("()Ljava/lang/ClassLoader;").unwrap();
        assert!(d.parameters.is_empty());
        assert_eq!(
            d.return_type,
            Some(FieldType::Object("java/lang/ClassLoader".into()))
        );
        assert_eq!(d.return_category(), ValueCategory::Reference);

        let d = MethodDescriptor::parse("(Ljava/lang/Class;)Z").unwrap();
        assert_eq!(d.parameters.len(), 1);
        assert_eq!(d.return_category(), ValueCategory::Int);

        let d = MethodDescriptor::parse("()[Ljava/lang/Object;").unwrap();
        assert_eq!(
            d.return_type,
            Some(FieldType::Array(Box::new(FieldType::Object(
                "java/lang/Object".into()
            ))))
        );
    }

    #[test]
    fn test_parse_void_and_wide() {
        let d = MethodDescriptor::parse("(IJ[[DLjava/lang/String;)V").unwrap();
        assert_eq!(d.result_count(), 0);
        assert_eq!(d.return_category(), ValueCategory::Void);
        assert_eq!(
            d.parameters
                .iter()
                .map(FieldType::category)
                .collect::<Vec<_>>(),
            vec![
                ValueCategory::Int,
                ValueCategory::Long,
                ValueCategory::Reference,
                ValueCategory::Reference
            ]
        );
        assert_eq!(d.to_string(), "(IJ[[DLjava/lang/String;)V");
    }

    #[test]
    fn test_reject_malformed() {
        for bad in ["", "V", "()", "(I", "()Q", "(L;)V", "()II", "(Ljava/lang/Object)V", "()VV"] {
            assert!(
                matches!(
                    MethodDescriptor::parse(bad),
                    Err(VmError::MalformedDescriptor { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }
}
