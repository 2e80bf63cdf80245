use super::matcher::member_matches;
use super::targets::{ResolvedClass, ResolvedTargets};
use crate::directive::{Directive, NamePattern};
use crate::error::TargetResolutionError;
use crate::universe::{AnnotationInfo, TypeInfo, TypeKind, TypeUniverse, loader_chain};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

const LOG_TARGET: &str = "      scan";

/// Which defining loaders are reachable for a scan.
#[derive(Debug)]
enum Visibility {
    /// No loader was named anywhere: every type is a candidate.
    All,

    /// The bootstrap loader (`None`) plus every loader on the named chains.
    Loaders(HashSet<Option<String>>),
}

impl Visibility {
    fn new(universe: &dyn TypeUniverse, roots: &[String]) -> Self {
        if roots.is_empty() {
            return Self::All;
        }

        let mut loaders = HashSet::from([None]);
        for root in roots {
            loaders.extend(loader_chain(universe, root).into_iter().map(Some));
        }

        Self::Loaders(loaders)
    }

    fn admits(&self, info: &TypeInfo) -> bool {
        match self {
            Self::All => true,
            Self::Loaders(loaders) => loaders.contains(&info.loader),
        }
    }
}

/// Resolve a directive against a universe.
///
/// This walks the whole universe for open directives and is meant to run on the scan pool.
pub fn resolve_targets(
    universe: &dyn TypeUniverse,
    context_loader: Option<&str>,
    directive: &Arc<Directive>,
) -> Result<ResolvedTargets, TargetResolutionError> {
    let fail = |message: String| TargetResolutionError::new(message, directive.source());
    let class = directive.class();

    let hint = hint_loader(universe, class.loader()).map_err(&fail)?;
    let lookup_loader = hint.as_deref().or(context_loader);

    let roots: Vec<String> = hint.iter().cloned().chain(context_loader.map(ToString::to_string)).collect();

    let candidates = match (class.pattern(), class.is_annotation()) {
        (NamePattern::Literal(name), false) => {
            let Some(target) = universe.find_type(name, lookup_loader) else {
                return Err(fail(format!("type '{name}' not found")));
            };

            if !class.is_inherited() || target.is_final() {
                vec![target]
            } else {
                let visible = visible_types(universe, &roots);
                with_subtypes(&visible, vec![target])
            }
        }

        (NamePattern::Literal(name), true) => {
            let visible = visible_types(universe, &roots);

            // Fully-qualified first, then a visible annotation type with that simple name
            let Some(annotation) = universe.find_type(name, lookup_loader).or_else(|| {
                visible
                    .iter()
                    .find(|info| info.kind == TypeKind::Annotation && info.simple_name() == name.as_str())
                    .cloned()
            }) else {
                return Err(fail(format!("annotation type '{name}' not found")));
            };

            if annotation.kind != TypeKind::Annotation {
                return Err(fail(format!("'{name}' is not an annotation type")));
            }

            let mut names = if class.is_inherited() {
                meta_annotated(&visible, &annotation.name)
            } else {
                HashSet::from([annotation.name.clone()])
            };
            let _ = names.insert(name.clone());

            let annotated: Vec<_> = visible
                .iter()
                .filter(|info| info.kind != TypeKind::Annotation)
                .filter(|info| annotated_with(&info.annotations, &names))
                .cloned()
                .collect();

            if class.is_inherited() {
                with_subtypes(&visible, annotated)
            } else {
                annotated
            }
        }

        (pattern, _) => {
            let visible = visible_types(universe, &roots);
            let matched: Vec<_> = visible
                .iter()
                .filter(|info| info.kind != TypeKind::Annotation && pattern.matches(&info.name))
                .cloned()
                .collect();

            if class.is_inherited() {
                with_subtypes(&visible, matched)
            } else {
                matched
            }
        }
    };

    let classes = ordered(candidates)
        .into_iter()
        .map(|info| {
            let mut members: Vec<usize> = info
                .members
                .iter()
                .enumerate()
                .filter(|(_, member)| member_matches(directive.method(), member))
                .map(|(index, _)| index)
                .collect();

            members.sort_by_cached_key(|&index| {
                let member = &info.members[index];
                (member.name.clone(), member.signature())
            });

            ResolvedClass::new(info, members)
        })
        .collect();

    Ok(ResolvedTargets::new(Arc::clone(directive), classes))
}

/// Evaluate the `<...>` classloader expression into a loader name.
///
/// `Ok(None)` means no hint, or a `type:` hint naming a bootstrap type.
fn hint_loader(universe: &dyn TypeUniverse, expression: Option<&str>) -> Result<Option<String>, String> {
    let Some(expression) = expression else {
        return Ok(None);
    };

    if let Some(type_name) = expression.strip_prefix("type:") {
        let type_name = type_name.trim();
        return universe
            .find_type(type_name, None)
            .map(|info| info.loader.clone())
            .ok_or_else(|| format!("classloader expression names unknown type '{type_name}'"));
    }

    if universe.has_loader(expression) {
        Ok(Some(expression.to_string()))
    } else {
        Err(format!("unknown classloader '{expression}'"))
    }
}

fn visible_types(universe: &dyn TypeUniverse, roots: &[String]) -> Vec<Arc<TypeInfo>> {
    let visibility = Visibility::new(universe, roots);

    let mut visible = Vec::new();
    universe.for_each_type(&mut |info| {
        if visibility.admits(info) {
            visible.push(Arc::clone(info));
        }
    });

    log::debug!(target: LOG_TARGET, "Scanning {} visible types from loaders {roots:?}", visible.len());
    visible
}

/// The annotation type plus every annotation type (meta-)annotated with it.
fn meta_annotated(visible: &[Arc<TypeInfo>], root: &str) -> HashSet<String> {
    let mut names = HashSet::from([root.to_string()]);

    loop {
        let before = names.len();
        for info in visible.iter().filter(|info| info.kind == TypeKind::Annotation) {
            if !names.contains(&info.name) && annotated_with(&info.annotations, &names) {
                let _ = names.insert(info.name.clone());
            }
        }

        if names.len() == before {
            return names;
        }
    }
}

/// Annotations match by fully-qualified or simple name, as member annotations do.
fn annotated_with(annotations: &[AnnotationInfo], names: &HashSet<String>) -> bool {
    annotations.iter().any(|annotation| names.iter().any(|name| annotation.matches(name)))
}

/// `seeds` plus all of their transitive subtypes and implementors among `visible`.
fn with_subtypes(visible: &[Arc<TypeInfo>], seeds: Vec<Arc<TypeInfo>>) -> Vec<Arc<TypeInfo>> {
    let mut subtypes: HashMap<&str, Vec<&Arc<TypeInfo>>> = HashMap::new();
    for info in visible {
        for supertype in info.supertypes() {
            subtypes.entry(supertype).or_default().push(info);
        }
    }

    let mut queue: VecDeque<String> = seeds.iter().map(|info| info.name.clone()).collect();
    let mut expanded = HashSet::new();
    let mut result = seeds;

    while let Some(name) = queue.pop_front() {
        if !expanded.insert(name.clone()) {
            continue;
        }

        for &child in subtypes.get(name.as_str()).into_iter().flatten() {
            result.push(Arc::clone(child));
            queue.push_back(child.name.clone());
        }
    }

    result
}

/// Sort by name then defining loader, dropping duplicates.
fn ordered(mut classes: Vec<Arc<TypeInfo>>) -> Vec<Arc<TypeInfo>> {
    classes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.loader.cmp(&b.loader)));
    classes.dedup_by(|a, b| a.name == b.name && a.loader == b.loader);
    classes
}
