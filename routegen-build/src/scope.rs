//! Name resolution across the modules of a compilation.
//!
//! Only what route classification needs: the types and child modules each
//! module declares, the names its `use` items bring into scope, and which
//! modules can be named from the crate root. Glob imports of crate-local
//! modules are followed. A multi-segment path nothing explains is taken as an
//! external crate path; a single name nothing explains only resolves when the
//! marker library's prelude exports it.

use std::collections::{BTreeMap, BTreeSet};

use syn::visit::{self, Visit};
use syn::{Item, ItemMod, Path, PathArguments, UseTree, Visibility};

use crate::compilation::{Compilation, ModulePath};

const MAX_IMPORT_DEPTH: usize = 16;

/// Types the marker library exports through `<library>::prelude`.
pub const LIBRARY_PRELUDE: &[&str] = &[
    "Configurator",
    "Error",
    "IntoResponse",
    "Json",
    "Method",
    "PathParams",
    "Request",
    "RequireAuthorization",
    "Response",
    "RouteEntry",
    "Router",
    "StatusCode",
];

#[derive(Debug, Clone)]
struct Import {
    leading_colon: bool,
    segments: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct ModuleScope {
    declared: BTreeSet<String>,
    imports: BTreeMap<String, Import>,
    globs: Vec<Import>,
}

/// Declarations and imports of every module in a compilation.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    modules: BTreeMap<ModulePath, ModuleScope>,
    /// Modules whose declaration cannot be named from the crate root.
    hidden: BTreeSet<ModulePath>,
}

impl SymbolTable {
    pub fn build(compilation: &Compilation) -> Self {
        let mut table = Self::default();
        for file in compilation.files() {
            let mut builder = ScopeBuilder {
                module: file.module.clone(),
                table: &mut table,
            };
            builder.visit_file(&file.syntax);
        }
        table
    }

    /// Resolves `path` as written inside `module` to a path that names the
    /// same item from the crate root.
    ///
    /// Returns `None` for `Self` paths, paths carrying generic arguments and
    /// single names that are neither declared, imported nor exported by the
    /// prelude of `library`.
    pub fn resolve(&self, module: &ModulePath, path: &Path, library: &str) -> Option<String> {
        let mut segments = Vec::with_capacity(path.segments.len());
        for segment in &path.segments {
            if !matches!(segment.arguments, PathArguments::None) {
                return None;
            }
            segments.push(segment.ident.to_string());
        }
        let resolved = self.absolutize(module, path.leading_colon.is_some(), &segments, 0)?;

        match resolved.as_slice() {
            [name] if LIBRARY_PRELUDE.contains(&name.as_str()) => {
                Some(format!("::{}::prelude::{}", library, name))
            }
            [_] => None,
            _ => Some(render(&resolved)),
        }
    }

    /// Whether an item declared in `module` with `vis` can be named from the
    /// crate root.
    pub fn visible_from_root(&self, module: &ModulePath, vis: &Visibility) -> bool {
        if !reaches_root(vis, module.segments().len()) {
            return false;
        }

        let mut ancestor = ModulePath::root();
        for segment in module.segments() {
            ancestor = ancestor.child(segment);
            if self.hidden.contains(&ancestor) {
                return false;
            }
        }
        true
    }

    /// Name of the marker an attribute path refers to, if it refers to one
    /// exported by `library`.
    ///
    /// Unqualified names that no import explains (glob or prelude imports)
    /// are taken at face value.
    pub fn marker_name(&self, module: &ModulePath, path: &Path, library: &str) -> Option<String> {
        let segments: Vec<String> = path
            .segments
            .iter()
            .map(|segment| segment.ident.to_string())
            .collect();
        let resolved = self.absolutize(module, path.leading_colon.is_some(), &segments, 0)?;

        match resolved.as_slice() {
            [name] => Some(name.clone()),
            [first, .., last] if first == library || *first == format!("::{}", library) => {
                Some(last.clone())
            }
            _ => None,
        }
    }

    fn absolutize(
        &self,
        module: &ModulePath,
        leading_colon: bool,
        segments: &[String],
        depth: usize,
    ) -> Option<Vec<String>> {
        if depth > MAX_IMPORT_DEPTH {
            return None;
        }
        let (first, rest) = segments.split_first()?;

        if leading_colon {
            let mut out = vec![format!("::{}", first)];
            out.extend_from_slice(rest);
            return Some(out);
        }

        match first.as_str() {
            "crate" => Some(segments.to_vec()),
            "Self" => None,
            "self" => Some(join(module, rest)),
            "super" => {
                let mut base = module.parent()?;
                let mut rest = rest;
                while let Some((next, tail)) = rest.split_first() {
                    if next != "super" {
                        break;
                    }
                    base = base.parent()?;
                    rest = tail;
                }
                Some(join(&base, rest))
            }
            _ => {
                let scope = self.modules.get(module);
                if scope.is_some_and(|scope| scope.declared.contains(first)) {
                    return Some(join(module, segments));
                }
                if let Some(import) = scope.and_then(|scope| scope.imports.get(first)) {
                    return self.follow(module, import, rest, depth);
                }

                Some(
                    self.through_globs(module, segments, depth)
                        .unwrap_or_else(|| segments.to_vec()),
                )
            }
        }
    }

    fn follow(
        &self,
        module: &ModulePath,
        import: &Import,
        rest: &[String],
        depth: usize,
    ) -> Option<Vec<String>> {
        let mut target = import.segments.clone();
        target.extend_from_slice(rest);
        self.absolutize(module, import.leading_colon, &target, depth + 1)
    }

    /// Looks the first segment up in the crate-local modules `module`
    /// glob-imports, in import order.
    fn through_globs(
        &self,
        module: &ModulePath,
        segments: &[String],
        depth: usize,
    ) -> Option<Vec<String>> {
        if depth > MAX_IMPORT_DEPTH {
            return None;
        }
        let (first, rest) = segments.split_first()?;
        let scope = self.modules.get(module)?;

        scope.globs.iter().find_map(|glob| {
            let source = self.glob_source(module, scope, glob, depth)?;
            let exporter = self.modules.get(&source)?;

            if exporter.declared.contains(first) {
                Some(join(&source, segments))
            } else if let Some(import) = exporter.imports.get(first) {
                self.follow(&source, import, rest, depth + 1)
            } else {
                self.through_globs(&source, segments, depth + 1)
            }
        })
    }

    /// Crate-local module a glob import reads from. The glob's own path is
    /// resolved without consulting other globs.
    fn glob_source(
        &self,
        module: &ModulePath,
        scope: &ModuleScope,
        glob: &Import,
        depth: usize,
    ) -> Option<ModulePath> {
        let first = glob.segments.first()?;
        let explicit = glob.leading_colon
            || matches!(first.as_str(), "crate" | "self" | "super")
            || scope.declared.contains(first)
            || scope.imports.contains_key(first);
        if !explicit {
            return None;
        }
        local_module(&self.absolutize(module, glob.leading_colon, &glob.segments, depth + 1)?)
    }

    fn scope_mut(&mut self, module: &ModulePath) -> &mut ModuleScope {
        self.modules.entry(module.clone()).or_default()
    }
}

fn join(module: &ModulePath, rest: &[String]) -> Vec<String> {
    let mut out = vec!["crate".to_string()];
    out.extend_from_slice(module.segments());
    out.extend_from_slice(rest);
    out
}

fn render(segments: &[String]) -> String {
    segments.join("::")
}

/// Module named by an absolute `crate::...` path.
fn local_module(segments: &[String]) -> Option<ModulePath> {
    let (first, rest) = segments.split_first()?;
    if first != "crate" {
        return None;
    }
    let mut module = ModulePath::root();
    for segment in rest {
        module = module.child(segment);
    }
    Some(module)
}

/// Whether `vis` on an item of a module `depth` levels below the root
/// extends to the root.
fn reaches_root(vis: &Visibility, depth: usize) -> bool {
    match vis {
        Visibility::Public(_) => true,
        Visibility::Restricted(restricted) if restricted.path.is_ident("crate") => true,
        Visibility::Restricted(restricted) if restricted.path.is_ident("super") => depth <= 1,
        Visibility::Restricted(_) | Visibility::Inherited => depth == 0,
    }
}

struct ScopeBuilder<'a> {
    module: ModulePath,
    table: &'a mut SymbolTable,
}

impl ScopeBuilder<'_> {
    fn declare(&mut self, name: String) {
        self.table.scope_mut(&self.module).declared.insert(name);
    }

    fn import(&mut self, prefix: &mut Vec<String>, leading_colon: bool, tree: &UseTree) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.import(prefix, leading_colon, &path.tree);
                prefix.pop();
            }
            UseTree::Name(name) => {
                let ident = name.ident.to_string();
                if ident == "self" {
                    if let Some(last) = prefix.last().cloned() {
                        self.insert_import(last, leading_colon, prefix.clone());
                    }
                } else {
                    let mut segments = prefix.clone();
                    segments.push(ident.clone());
                    self.insert_import(ident, leading_colon, segments);
                }
            }
            UseTree::Rename(rename) => {
                let mut segments = prefix.clone();
                if rename.ident != "self" {
                    segments.push(rename.ident.to_string());
                }
                self.insert_import(rename.rename.to_string(), leading_colon, segments);
            }
            UseTree::Glob(_) => {
                if !prefix.is_empty() {
                    self.table.scope_mut(&self.module).globs.push(Import {
                        leading_colon,
                        segments: prefix.clone(),
                    });
                }
            }
            UseTree::Group(group) => {
                for tree in &group.items {
                    self.import(prefix, leading_colon, tree);
                }
            }
        }
    }

    fn insert_import(&mut self, local: String, leading_colon: bool, segments: Vec<String>) {
        if local == "_" || segments.is_empty() {
            return;
        }
        self.table.scope_mut(&self.module).imports.insert(
            local,
            Import {
                leading_colon,
                segments,
            },
        );
    }
}

impl<'ast> Visit<'ast> for ScopeBuilder<'_> {
    fn visit_item(&mut self, item: &'ast Item) {
        match item {
            Item::Struct(item) => self.declare(item.ident.to_string()),
            Item::Enum(item) => self.declare(item.ident.to_string()),
            Item::Union(item) => self.declare(item.ident.to_string()),
            Item::Type(item) => self.declare(item.ident.to_string()),
            Item::Trait(item) => self.declare(item.ident.to_string()),
            Item::Use(item) => {
                let mut prefix = Vec::new();
                self.import(&mut prefix, item.leading_colon.is_some(), &item.tree);
            }
            Item::Mod(item) => self.visit_item_mod(item),
            _ => {}
        }
    }

    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        let name = node.ident.to_string();
        self.declare(name.clone());

        let child = self.module.child(&name);
        if !reaches_root(&node.vis, self.module.segments().len()) {
            self.table.hidden.insert(child.clone());
        }

        if node.content.is_some() {
            let parent = std::mem::replace(&mut self.module, child);
            visit::visit_item_mod(self, node);
            self.module = parent;
        }
    }
}
