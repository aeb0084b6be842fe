use jvm_rs::{
    error::VmError,
    loader::ClassDef,
    types::{ClassId, ClassSource, LoaderId},
    value::ObjectRef,
    vm::Runtime,
};

fn load(runtime: &Runtime, name: &str) -> ClassId {
    runtime.load_class(LoaderId::BOOTSTRAP, name).unwrap()
}

fn assignable(runtime: &Runtime, source: &str, target: &str) -> bool {
    runtime.is_assignable(load(runtime, source), load(runtime, target))
}

#[test]
fn reflexive_for_classes_and_interfaces() {
    let runtime = Runtime::new();
    for name in [
        "java/lang/Object",
        "java/lang/String",
        "java/lang/Runnable",
        "java/util/HashMap",
        "java/util/Map$Entry",
    ] {
        assert!(assignable(&runtime, name, name), "{name}");
    }
}

#[test]
fn superclass_chain_and_interface_closure() {
    let runtime = Runtime::new();
    assert!(assignable(&runtime, "java/lang/Integer", "java/lang/Number"));
    assert!(assignable(&runtime, "java/lang/Integer", "java/lang/Object"));
    // inherited from Number
    assert!(assignable(&runtime, "java/lang/Integer", "java/io/Serializable"));
    assert!(assignable(&runtime, "java/lang/Integer", "java/lang/Comparable"));
    assert!(assignable(&runtime, "java/util/HashMap", "java/util/AbstractMap"));
    assert!(assignable(&runtime, "java/util/AbstractMap", "java/util/Map"));
    assert!(assignable(&runtime, "java/util/HashMap", "java/util/Map"));
    assert!(assignable(&runtime, "java/util/HashMap$Node", "java/util/Map$Entry"));
    assert!(assignable(&runtime, "java/lang/Thread$State", "java/lang/Enum"));
    assert!(assignable(&runtime, "java/lang/Thread$State", "java/io/Serializable"));
    // super-interface of a direct interface
    assert!(assignable(
        &runtime,
        "java/lang/Class",
        "java/lang/reflect/AnnotatedElement"
    ));

    assert!(!assignable(&runtime, "java/lang/Number", "java/lang/Integer"));
    assert!(!assignable(&runtime, "java/lang/Object", "java/lang/Runnable"));
    assert!(!assignable(&runtime, "java/lang/String", "java/lang/Number"));
    assert!(!assignable(&runtime, "java/util/Map", "java/util/HashMap"));
}

#[test]
fn interfaces_are_objects() {
    let runtime = Runtime::new();
    assert!(assignable(&runtime, "java/lang/Runnable", "java/lang/Object"));
    assert!(assignable(&runtime, "java/util/Map$Entry", "java/lang/Object"));
    assert!(!assignable(&runtime, "java/lang/Runnable", "java/lang/Thread"));
}

#[test]
fn transitive() {
    let runtime = Runtime::new();
    let chain = ["java/lang/Integer", "java/lang/Number", "java/io/Serializable"];
    assert!(assignable(&runtime, chain[0], chain[1]));
    assert!(assignable(&runtime, chain[1], chain[2]));
    assert!(assignable(&runtime, chain[0], chain[2]));

    let arrays = ["[Ljava/lang/Integer;", "[Ljava/lang/Number;", "[Ljava/lang/Object;"];
    assert!(assignable(&runtime, arrays[0], arrays[1]));
    assert!(assignable(&runtime, arrays[1], arrays[2]));
    assert!(assignable(&runtime, arrays[0], arrays[2]));
}

#[test]
fn reference_arrays_are_covariant() {
    let runtime = Runtime::new();
    assert!(assignable(&runtime, "[Ljava/lang/String;", "[Ljava/lang/Object;"));
    assert!(assignable(&runtime, "[Ljava/lang/String;", "[Ljava/lang/CharSequence;"));
    assert!(!assignable(&runtime, "[Ljava/lang/Object;", "[Ljava/lang/String;"));
    assert!(!assignable(&runtime, "[Ljava/lang/String;", "[Ljava/lang/Number;"));
    assert!(assignable(&runtime, "[[I", "[Ljava/lang/Object;"));
    assert!(assignable(&runtime, "[[Ljava/lang/String;", "[[Ljava/lang/Object;"));
    assert!(!assignable(&runtime, "[[Ljava/lang/String;", "[Ljava/lang/String;"));
}

#[test]
fn primitive_arrays_are_invariant() {
    let runtime = Runtime::new();
    assert!(assignable(&runtime, "[I", "[I"));
    assert!(!assignable(&runtime, "[I", "[J"));
    assert!(!assignable(&runtime, "[I", "[Ljava/lang/Object;"));
    assert!(!assignable(&runtime, "[Ljava/lang/Integer;", "[I"));
}

#[test]
fn arrays_are_cloneable_and_serializable() {
    let runtime = Runtime::new();
    for array in ["[I", "[Ljava/lang/String;", "[[D"] {
        assert!(assignable(&runtime, array, "java/lang/Object"), "{array}");
        assert!(assignable(&runtime, array, "java/lang/Cloneable"), "{array}");
        assert!(assignable(&runtime, array, "java/io/Serializable"), "{array}");
        assert!(!assignable(&runtime, array, "java/lang/Runnable"), "{array}");
        assert!(!assignable(&runtime, "java/lang/Object", array), "{array}");
    }
}

#[test]
fn primitives_only_match_themselves() {
    let runtime = Runtime::new();
    let int = runtime.area.primitive_class("int").unwrap();
    let long = runtime.area.primitive_class("long").unwrap();
    let object = load(&runtime, "java/lang/Object");
    assert!(runtime.is_assignable(int, int));
    assert!(!runtime.is_assignable(int, long));
    assert!(!runtime.is_assignable(int, object));
    assert!(!runtime.is_assignable(object, int));
}

#[test]
fn instance_checks() {
    let runtime = Runtime::new();
    let object = load(&runtime, "java/lang/Object");
    let sequence = load(&runtime, "java/lang/CharSequence");
    let number = load(&runtime, "java/lang/Number");
    assert!(!runtime.is_instance(&ObjectRef::NULL, object));

    let text = runtime.new_string("hello").unwrap();
    assert!(runtime.is_instance(&text, object));
    assert!(runtime.is_instance(&text, sequence));
    assert!(!runtime.is_instance(&text, number));
}

#[test]
fn user_classes_see_boot_classes() {
    let runtime = Runtime::new();
    let app = runtime.new_loader("app", ClassSource::ClassPath("app.jar".into()));
    app.add_definition(ClassDef::class("com/example/Task").implements("java/lang/Runnable"));
    app.add_definition(ClassDef::class("com/example/SlowTask").extends("com/example/Task"));

    let slow = runtime.load_class(app.id, "com/example/SlowTask").unwrap();
    let task = runtime.load_class(app.id, "com/example/Task").unwrap();
    let runnable = load(&runtime, "java/lang/Runnable");
    assert!(runtime.is_assignable(slow, task));
    assert!(runtime.is_assignable(slow, runnable));
    assert!(!runtime.is_assignable(task, slow));

    let slow_array = runtime.load_class(app.id, "[Lcom/example/SlowTask;").unwrap();
    let runnable_array = runtime.load_class(app.id, "[Ljava/lang/Runnable;").unwrap();
    assert!(runtime.is_assignable(slow_array, runnable_array));
    assert_eq!(runtime.class(slow_array).defining_loader(), app.id);
    assert_eq!(runtime.class(runnable_array).defining_loader(), LoaderId::BOOTSTRAP);
}

#[test]
fn same_name_in_two_loaders_is_two_classes() {
    let runtime = Runtime::new();
    let first = runtime.new_loader("first", ClassSource::ClassPath("a.jar".into()));
    let second = runtime.new_loader("second", ClassSource::ClassPath("b.jar".into()));
    first.add_definition(ClassDef::class("com/example/Plugin"));
    second.add_definition(ClassDef::class("com/example/Plugin"));

    let a = runtime.load_class(first.id, "com/example/Plugin").unwrap();
    let b = runtime.load_class(second.id, "com/example/Plugin").unwrap();
    assert_ne!(a, b);
    assert!(!runtime.is_assignable(a, b));
    assert_eq!(runtime.load_class(first.id, "com/example/Plugin").unwrap(), a);
}

#[test]
fn results_are_memoized() {
    let runtime = Runtime::new();
    let integer = load(&runtime, "java/lang/Integer");
    let serializable = load(&runtime, "java/io/Serializable");
    let before = runtime.metrics.snapshot();
    assert!(runtime.is_assignable(integer, serializable));
    assert!(runtime.is_assignable(integer, serializable));
    let after = runtime.metrics.snapshot();
    assert_eq!(after.assignability_cache_misses, before.assignability_cache_misses + 1);
    assert_eq!(after.assignability_cache_hits, before.assignability_cache_hits + 1);
}

#[test]
fn circular_hierarchy_is_rejected() {
    let runtime = Runtime::new();
    let app = runtime.new_loader("app", ClassSource::ClassPath("app.jar".into()));
    app.add_definition(ClassDef::class("com/example/A").extends("com/example/B"));
    app.add_definition(ClassDef::class("com/example/B").extends("com/example/A"));

    let err = runtime.load_class(app.id, "com/example/A").unwrap_err();
    assert!(matches!(err, VmError::ClassCircularity(_)), "{err:?}");
    assert_eq!(err.guest_exception(), Some("java/lang/ClassCircularityError"));
    assert!(app.find_loaded("com/example/A").is_none());
}

#[test]
fn class_cannot_extend_interface() {
    let runtime = Runtime::new();
    let app = runtime.new_loader("app", ClassSource::ClassPath("app.jar".into()));
    app.add_definition(ClassDef::class("com/example/Bad").extends("java/lang/Runnable"));
    app.add_definition(ClassDef::class("com/example/Worse").implements("java/lang/Object"));

    for name in ["com/example/Bad", "com/example/Worse"] {
        let err = runtime.load_class(app.id, name).unwrap_err();
        assert!(matches!(err, VmError::IncompatibleClassChange(_, _)), "{err:?}");
    }
}

#[test]
fn missing_classes() {
    let runtime = Runtime::new();
    let err = runtime
        .load_class(LoaderId::BOOTSTRAP, "com/example/Missing")
        .unwrap_err();
    assert_eq!(err, VmError::ClassNotFound("com/example/Missing".into()));
    assert_eq!(err.guest_exception(), Some("java/lang/NoClassDefFoundError"));

    for malformed in ["[V", "[L;", "[Ljava/lang/String", "[II"] {
        assert!(runtime.load_class(LoaderId::BOOTSTRAP, malformed).is_err(), "{malformed}");
    }
}
