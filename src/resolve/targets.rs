use crate::directive::Directive;
use crate::universe::{MemberInfo, TypeInfo};
use std::sync::Arc;

/// One type selected by a directive, with the members that matched.
#[derive(Debug, Clone)]
pub struct ResolvedClass {
    info: Arc<TypeInfo>,
    members: Vec<usize>,
}

impl ResolvedClass {
    /// `members` index into `info.members` and must already be in output order.
    pub(super) const fn new(info: Arc<TypeInfo>, members: Vec<usize>) -> Self {
        Self { info, members }
    }

    #[must_use]
    pub const fn info(&self) -> &Arc<TypeInfo> {
        &self.info
    }

    /// Matched members, ordered by name then rendered signature.
    pub fn members(&self) -> impl Iterator<Item = &MemberInfo> {
        self.members.iter().map(|&index| &self.info.members[index])
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// A single `(type, member)` pair together with the directive that selected it.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    class: Arc<TypeInfo>,
    member: usize,
    directive: Arc<Directive>,
}

impl ResolvedTarget {
    #[must_use]
    pub const fn class(&self) -> &Arc<TypeInfo> {
        &self.class
    }

    #[must_use]
    pub fn member(&self) -> &MemberInfo {
        &self.class.members[self.member]
    }

    #[must_use]
    pub const fn directive(&self) -> &Arc<Directive> {
        &self.directive
    }
}

/// Everything a directive selected from the type universe.
///
/// Classes are ordered by name then defining loader, and each appears once. A class whose
/// members all failed to match is still listed, with no members.
#[derive(Debug, Clone)]
pub struct ResolvedTargets {
    directive: Arc<Directive>,
    classes: Vec<ResolvedClass>,
}

impl ResolvedTargets {
    pub(super) const fn new(directive: Arc<Directive>, classes: Vec<ResolvedClass>) -> Self {
        Self { directive, classes }
    }

    #[must_use]
    pub const fn directive(&self) -> &Arc<Directive> {
        &self.directive
    }

    #[must_use]
    pub fn classes(&self) -> &[ResolvedClass] {
        &self.classes
    }

    /// Every selected `(type, member)` pair, in output order.
    pub fn targets(&self) -> impl Iterator<Item = ResolvedTarget> + '_ {
        self.classes.iter().flat_map(|class| {
            class.members.iter().map(|&member| ResolvedTarget {
                class: Arc::clone(&class.info),
                member,
                directive: Arc::clone(&self.directive),
            })
        })
    }

    /// Number of selected members across all classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.iter().map(ResolvedClass::member_count).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
