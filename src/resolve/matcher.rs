use crate::directive::{MethodSpec, NamePattern};
use crate::options::modifiers_match;
use crate::universe::{MemberInfo, MemberKind};

/// Whether a declared member satisfies the method half of a directive.
///
/// A member matches when its name (or, in annotation mode, one of its annotations), its
/// modifiers, and its rendered signature all match. Constructors are only selected by
/// naming `<init>` explicitly.
#[must_use]
pub fn member_matches(spec: &MethodSpec, member: &MemberInfo) -> bool {
    name_matches(spec, member) && modifiers_match(spec.attributes(), member.modifiers) && spec.signature().matches(&member.signature())
}

fn name_matches(spec: &MethodSpec, member: &MemberInfo) -> bool {
    if spec.is_annotation() {
        return spec.pattern().literal().is_some_and(|annotation| member.annotation(annotation).is_some());
    }

    match (spec.pattern(), member.kind) {
        (NamePattern::Literal(name), _) => *name == member.name,
        (_, MemberKind::Constructor) => false,
        (pattern, MemberKind::Method) => pattern.matches(&member.name),
    }
}
