use super::ClassDef;
use crate::types::{AccessFlags, EnclosingMethod};

const PUBLIC_FINAL: AccessFlags = AccessFlags::from_bits(0x0001 | 0x0010 | 0x0020);
const PUBLIC_ABSTRACT: AccessFlags = AccessFlags::from_bits(0x0001 | 0x0400 | 0x0020);

/// Class definitions available on the built-in search path.
pub fn boot_class_path() -> Vec<ClassDef> {
    vec![
        ClassDef {
            super_name: None,
            ..ClassDef::class("java/lang/Object")
        },
        ClassDef::interface("java/io/Serializable"),
        ClassDef::interface("java/lang/Cloneable"),
        ClassDef::interface("java/lang/Comparable"),
        ClassDef::interface("java/lang/CharSequence"),
        ClassDef::interface("java/lang/Runnable"),
        ClassDef::interface("java/lang/reflect/Type"),
        ClassDef::interface("java/lang/reflect/GenericDeclaration")
            .implements("java/lang/reflect/AnnotatedElement"),
        ClassDef::interface("java/lang/reflect/AnnotatedElement"),
        ClassDef::class("java/lang/Class")
            .flags(PUBLIC_FINAL)
            .implements("java/io/Serializable")
            .implements("java/lang/reflect/GenericDeclaration")
            .implements("java/lang/reflect/Type")
            .implements("java/lang/reflect/AnnotatedElement"),
        ClassDef::class("java/lang/ClassLoader").flags(PUBLIC_ABSTRACT),
        ClassDef::class("java/lang/String")
            .flags(PUBLIC_FINAL)
            .implements("java/io/Serializable")
            .implements("java/lang/Comparable")
            .implements("java/lang/CharSequence"),
        ClassDef::class("java/lang/Number")
            .flags(PUBLIC_ABSTRACT)
            .implements("java/io/Serializable"),
        ClassDef::class("java/lang/Integer")
            .flags(PUBLIC_FINAL)
            .extends("java/lang/Number")
            .implements("java/lang/Comparable"),
        ClassDef::class("java/lang/Thread").implements("java/lang/Runnable"),
        ClassDef::class("java/lang/Enum")
            .flags(PUBLIC_ABSTRACT)
            .implements("java/lang/Comparable")
            .implements("java/io/Serializable"),
        ClassDef::class("java/lang/Thread$State")
            .flags(PUBLIC_FINAL | AccessFlags::ENUM)
            .extends("java/lang/Enum"),
        ClassDef::class("java/lang/Throwable").implements("java/io/Serializable"),
        ClassDef::class("java/lang/Error").extends("java/lang/Throwable"),
        ClassDef::class("java/lang/LinkageError").extends("java/lang/Error"),
        ClassDef::class("java/lang/NoClassDefFoundError").extends("java/lang/LinkageError"),
        ClassDef::interface("java/util/Map"),
        ClassDef::interface("java/util/Map$Entry").flags(
            AccessFlags::PUBLIC
                | AccessFlags::STATIC
                | AccessFlags::INTERFACE
                | AccessFlags::ABSTRACT,
        ),
        ClassDef::class("java/util/AbstractMap")
            .flags(PUBLIC_ABSTRACT)
            .implements("java/util/Map"),
        ClassDef::class("java/util/HashMap")
            .extends("java/util/AbstractMap")
            .implements("java/util/Map")
            .implements("java/lang/Cloneable")
            .implements("java/io/Serializable"),
        ClassDef::class("java/util/HashMap$Node")
            .flags(AccessFlags::STATIC | AccessFlags::SUPER)
            .implements("java/util/Map$Entry"),
        ClassDef::class("java/util/HashMap$KeySet")
            .flags(AccessFlags::FINAL | AccessFlags::SUPER)
            .extends("java/util/AbstractSet"),
        ClassDef::class("java/util/AbstractSet")
            .flags(PUBLIC_ABSTRACT)
            .implements("java/util/Set"),
        ClassDef::interface("java/util/Set"),
        ClassDef::class("java/util/HashMap$1")
            .flags(AccessFlags::SUPER)
            .enclosed_by(EnclosingMethod::in_method(
                "java/util/HashMap",
                "keySet",
                "()Ljava/util/Set;",
            )),
        ClassDef::class("sun/reflect/ConstantPool"),
    ]
}
