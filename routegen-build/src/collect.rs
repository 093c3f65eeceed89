//! Syntactic pre-filter.
//!
//! One walk over every parsed file gathers the functions and types that carry
//! at least one attribute. Nothing is resolved here; the resolver decides
//! which of them are routes and generation targets.

use syn::visit::{self, Visit};
use syn::{
    Attribute, Generics, ImplItem, ItemEnum, ItemFn, ItemImpl, ItemMod, ItemStruct, ItemTrait,
    Signature, TraitItem, Visibility,
};

use crate::compilation::{Compilation, ModulePath};
use crate::diagnostics::Location;

/// Declaration a candidate function belongs to.
#[derive(Debug, Clone)]
pub enum Owner {
    /// An `impl` block.
    Impl {
        self_ty: syn::Type,
        generic: bool,
        trait_impl: bool,
    },
    /// A trait definition.
    Trait(syn::Ident),
    /// A free function.
    Module,
}

#[derive(Debug, Clone)]
pub struct CandidateMethod {
    pub module: ModulePath,
    pub owner: Owner,
    pub ident: syn::Ident,
    /// No `self` receiver.
    pub is_static: bool,
    pub attrs: Vec<Attribute>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct CandidateType {
    pub module: ModulePath,
    pub ident: syn::Ident,
    pub vis: Visibility,
    pub generic: bool,
    pub attrs: Vec<Attribute>,
    pub location: Location,
}

/// Candidates in traversal order.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    pub methods: Vec<CandidateMethod>,
    pub types: Vec<CandidateType>,
}

pub fn collect(compilation: &Compilation) -> Candidates {
    let mut candidates = Candidates::default();
    for file in compilation.files() {
        let mut collector = Collector {
            file: &file.path,
            module: file.module.clone(),
            out: &mut candidates,
        };
        collector.visit_file(&file.syntax);
    }
    tracing::debug!(
        methods = candidates.methods.len(),
        types = candidates.types.len(),
        "collected candidates"
    );
    candidates
}

struct Collector<'a> {
    file: &'a std::path::Path,
    module: ModulePath,
    out: &'a mut Candidates,
}

impl Collector<'_> {
    fn method(&mut self, owner: Owner, attrs: &[Attribute], sig: &Signature) {
        if attrs.is_empty() {
            return;
        }
        self.out.methods.push(CandidateMethod {
            module: self.module.clone(),
            owner,
            ident: sig.ident.clone(),
            is_static: sig.receiver().is_none(),
            attrs: attrs.to_vec(),
            location: Location::of(self.file, &sig.ident),
        });
    }

    fn ty(&mut self, ident: &syn::Ident, vis: &Visibility, generics: &Generics, attrs: &[Attribute]) {
        if attrs.is_empty() {
            return;
        }
        self.out.types.push(CandidateType {
            module: self.module.clone(),
            ident: ident.clone(),
            vis: vis.clone(),
            generic: !generics.params.is_empty(),
            attrs: attrs.to_vec(),
            location: Location::of(self.file, ident),
        });
    }
}

impl<'ast> Visit<'ast> for Collector<'_> {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        // Out-of-line modules arrive as their own source file.
        if node.content.is_none() {
            return;
        }
        let child = self.module.child(&node.ident.to_string());
        let parent = std::mem::replace(&mut self.module, child);
        visit::visit_item_mod(self, node);
        self.module = parent;
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        let owner = Owner::Impl {
            self_ty: (*node.self_ty).clone(),
            generic: !node.generics.params.is_empty(),
            trait_impl: node.trait_.is_some(),
        };
        for item in &node.items {
            if let ImplItem::Fn(func) = item {
                self.method(owner.clone(), &func.attrs, &func.sig);
            }
        }
    }

    fn visit_item_trait(&mut self, node: &'ast ItemTrait) {
        for item in &node.items {
            if let TraitItem::Fn(func) = item {
                self.method(Owner::Trait(node.ident.clone()), &func.attrs, &func.sig);
            }
        }
    }

    // Bodies are not walked: items declared inside a function are not
    // nameable from the generated code.
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.method(Owner::Module, &node.attrs, &node.sig);
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        self.ty(&node.ident, &node.vis, &node.generics, &node.attrs);
    }

    fn visit_item_enum(&mut self, node: &'ast ItemEnum) {
        self.ty(&node.ident, &node.vis, &node.generics, &node.attrs);
    }
}
