use crate::types::{Class, ClassId};
use std::{
    collections::{HashSet, VecDeque},
    sync::Arc,
};

pub trait ClassResolver {
    fn class(&self, id: ClassId) -> Arc<Class>;
}

/// Assignability queries over the descriptor graph (JVMS §6.5 `checkcast`).
pub struct ClassHierarchy<'a, R: ClassResolver + ?Sized> {
    resolver: &'a R,
}

impl<'a, R: ClassResolver + ?Sized> ClassHierarchy<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Whether every instance of `source` is also an instance of `target`.
    pub fn is_assignable(&self, source: ClassId, target: ClassId) -> bool {
        if source == target {
            return true;
        }

        let source = self.resolver.class(source);
        let target = self.resolver.class(target);

        if target.is_primitive() || source.is_primitive() {
            return false;
        }

        if target.is_array() {
            if !source.is_array() {
                return false;
            }
            let (Some(sc), Some(tc)) = (source.component, target.component) else {
                return false;
            };
            if sc == tc {
                return true;
            }
            let (s_comp, t_comp) = (self.resolver.class(sc), self.resolver.class(tc));
            if s_comp.is_primitive() || t_comp.is_primitive() {
                return false;
            }
            return self.is_assignable(sc, tc);
        }

        if target.is_root() {
            return true;
        }

        self.ancestors_and_interfaces(&source).any(|c| c == target.id)
    }

    /// `class`, its superclasses and every interface they reach, breadth
    /// first. Each class is yielded once.
    pub fn ancestors_and_interfaces(&self, class: &Class) -> impl Iterator<Item = ClassId> + 'a {
        let resolver = self.resolver;
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(class.id);
        std::iter::from_fn(move || {
            while let Some(current) = queue.pop_front() {
                if !seen.insert(current) {
                    continue;
                }
                let c = resolver.class(current);
                if let Some(super_class) = c.super_class {
                    queue.push_back(super_class);
                }
                queue.extend(c.interfaces.iter().copied());
                return Some(current);
            }
            None
        })
    }
}
