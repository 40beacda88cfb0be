use serde::{Deserialize, Serialize};

/// Root node: a parsed module.
///
/// `comments` holds the header comments that precede the first statement
/// (pragmas, license blocks). Comments between statements live in `body` as
/// [`Statement::Comment`] so they keep their position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub comments: Vec<Comment>,
    pub body: Vec<Statement>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate the import declarations of the module in source order
    pub fn imports(&self) -> impl Iterator<Item = &ImportDeclaration> {
        self.body.iter().filter_map(|stmt| match stmt {
            Statement::Import(import) => Some(import),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentKind {
    Line,
    Block,
}

/// A comment, stored without its delimiters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
}

impl Comment {
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            kind: CommentKind::Line,
            text: text.into(),
        }
    }

    pub fn block(text: impl Into<String>) -> Self {
        Self {
            kind: CommentKind::Block,
            text: text.into(),
        }
    }

    /// True for a `@flow` pragma, including variants such as `@flow strict`
    pub fn is_flow_pragma(&self) -> bool {
        let text = self.text.trim().trim_start_matches('*').trim_start();
        match text.strip_prefix("@flow") {
            Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
            None => false,
        }
    }
}

/// Top-level statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "statement")]
pub enum Statement {
    Import(ImportDeclaration),
    ExportNamed(ExportNamedDeclaration),
    ExportDefault(ExportDefaultDeclaration),
    ExportAll(ExportAllDeclaration),
    Declaration(Declaration),
    Comment(Comment),
    /// Any other statement, kept verbatim
    Raw { text: String },
    /// Blank separator between groups of synthesized statements
    Noop,
}

/// Binding kind of an import, export or specifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingKind {
    #[default]
    Value,
    Type,
    Typeof,
}

impl BindingKind {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            BindingKind::Value => None,
            BindingKind::Type => Some("type"),
            BindingKind::Typeof => Some("typeof"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDeclaration {
    pub kind: BindingKind,
    pub specifiers: Vec<ImportSpecifier>,
    /// Module specifier, unquoted
    pub source: String,
}

impl ImportDeclaration {
    /// `import { <imported> as <local> } from '<source>'`
    pub fn named(
        kind: BindingKind,
        imported: impl Into<String>,
        local: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            specifiers: vec![ImportSpecifier::Named {
                imported: imported.into(),
                local: local.into(),
                kind: None,
            }],
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ImportSpecifier {
    Default {
        local: String,
    },
    Namespace {
        local: String,
    },
    Named {
        imported: String,
        local: String,
        /// Per-specifier kind, as in `import { type A } from 'x'`
        kind: Option<BindingKind>,
    },
}

impl ImportSpecifier {
    pub fn local(&self) -> &str {
        match self {
            ImportSpecifier::Default { local }
            | ImportSpecifier::Namespace { local }
            | ImportSpecifier::Named { local, .. } => local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNamedDeclaration {
    pub kind: BindingKind,
    pub declaration: Option<Declaration>,
    pub specifiers: Vec<ExportSpecifier>,
    pub source: Option<String>,
}

impl ExportNamedDeclaration {
    pub fn declaration(declaration: Declaration) -> Self {
        Self {
            kind: BindingKind::Value,
            declaration: Some(declaration),
            specifiers: Vec::new(),
            source: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDefaultDeclaration {
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportAllDeclaration {
    pub kind: BindingKind,
    /// Namespace name for `export * as ns from '...'`
    pub exported: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Declaration {
    TypeAlias(TypeAlias),
    Variable(VariableDeclaration),
    Verbatim(VerbatimDeclaration),
}

impl Declaration {
    /// Names bound by this declaration and the kind of binding they create
    pub fn bindings(&self) -> Vec<(&str, BindingKind)> {
        match self {
            Declaration::TypeAlias(alias) => vec![(alias.name.as_str(), BindingKind::Type)],
            Declaration::Variable(var) => var
                .declarators
                .iter()
                .flat_map(|d| d.id.names())
                .map(|name| (name, BindingKind::Value))
                .collect(),
            Declaration::Verbatim(decl) => {
                let kind = match decl.kind {
                    VerbatimKind::Function | VerbatimKind::Class => BindingKind::Value,
                    VerbatimKind::Interface | VerbatimKind::OpaqueType => BindingKind::Type,
                };
                vec![(decl.name.as_str(), kind)]
            }
        }
    }
}

/// `type Name<Params> = Value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAlias {
    pub name: String,
    /// Type parameter list including its angle brackets
    pub type_params: Option<String>,
    pub value: TypeAnnotation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypeAnnotation {
    /// A named type such as `AppState` or `Immutable.Map`
    Generic { name: String },
    Object(ObjectType),
    Raw { text: String },
}

impl TypeAnnotation {
    pub fn generic(name: impl Into<String>) -> Self {
        TypeAnnotation::Generic { name: name.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    /// `{| ... |}`
    pub exact: bool,
    pub properties: Vec<ObjectTypeProperty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeProperty {
    pub key: String,
    pub optional: bool,
    pub value: TypeAnnotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableKind {
    Const,
    Let,
    Var,
}

impl VariableKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            VariableKind::Const => "const",
            VariableKind::Let => "let",
            VariableKind::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub declarators: Vec<VariableDeclarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub id: BindingPattern,
    pub type_annotation: Option<TypeAnnotation>,
    pub init: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BindingPattern {
    Identifier { name: String },
    /// Destructuring pattern, kept verbatim with the names it binds
    Pattern { text: String, names: Vec<String> },
}

impl BindingPattern {
    pub fn names(&self) -> Vec<&str> {
        match self {
            BindingPattern::Identifier { name } => vec![name.as_str()],
            BindingPattern::Pattern { names, .. } => names.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    Identifier { name: String },
    Object { properties: Vec<ObjectProperty> },
    Raw { text: String },
}

impl Expression {
    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Identifier { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub key: String,
    pub value: Expression,
    pub shorthand: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerbatimKind {
    Function,
    Class,
    Interface,
    OpaqueType,
}

/// Declaration whose body the engine never inspects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbatimDeclaration {
    pub kind: VerbatimKind,
    pub name: String,
    /// Full source of the declaration, without a leading `export`
    pub text: String,
}
