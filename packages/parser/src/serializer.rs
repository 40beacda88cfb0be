use crate::ast::*;
use serde::{Deserialize, Serialize};

/// Quote character used for module specifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quote {
    #[default]
    Single,
    Double,
}

impl Quote {
    fn char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }

    fn other(self) -> Quote {
        match self {
            Quote::Single => Quote::Double,
            Quote::Double => Quote::Single,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerOptions {
    pub quote: Quote,
    pub indent: String,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            quote: Quote::Single,
            indent: "  ".to_string(), // 2 spaces
        }
    }
}

/// Serializer converts a module back to source code
///
/// Structured statements are printed in a fixed layout: one statement per
/// line, terminated with `;`, object types and literals broken over one line
/// per field. Verbatim text (raw statements, function and class bodies,
/// unrecognized expressions) is printed exactly as it was parsed.
pub struct Serializer {
    options: SerializerOptions,
    indent_level: usize,
}

impl Serializer {
    pub fn new() -> Self {
        Self::with_options(SerializerOptions::default())
    }

    pub fn with_options(options: SerializerOptions) -> Self {
        Self {
            options,
            indent_level: 0,
        }
    }

    /// Serialize a module to source code
    pub fn serialize(&mut self, module: &Module) -> String {
        let mut output = String::new();

        for comment in &module.comments {
            self.serialize_comment(comment, &mut output);
            output.push('\n');
        }

        for statement in &module.body {
            self.serialize_statement(statement, &mut output);
            output.push('\n');
        }

        output
    }

    fn serialize_statement(&mut self, statement: &Statement, output: &mut String) {
        match statement {
            Statement::Import(import) => self.serialize_import(import, output),
            Statement::ExportNamed(export) => self.serialize_export_named(export, output),
            Statement::ExportDefault(export) => {
                output.push_str("export default ");
                self.serialize_expression(&export.value, output);
                if !is_block_text(&export.value) {
                    output.push(';');
                }
            }
            Statement::ExportAll(export) => {
                output.push_str("export ");
                push_kind(export.kind, output);
                output.push('*');
                if let Some(name) = &export.exported {
                    output.push_str(" as ");
                    output.push_str(name);
                }
                output.push_str(" from ");
                self.serialize_string(&export.source, output);
                output.push(';');
            }
            Statement::Declaration(declaration) => self.serialize_declaration(declaration, output),
            Statement::Comment(comment) => self.serialize_comment(comment, output),
            Statement::Raw { text } => output.push_str(text),
            Statement::Noop => {}
        }
    }

    fn serialize_import(&mut self, import: &ImportDeclaration, output: &mut String) {
        output.push_str("import ");
        push_kind(import.kind, output);

        if !import.specifiers.is_empty() {
            let mut named = Vec::new();
            let mut leading = Vec::new();
            for specifier in &import.specifiers {
                match specifier {
                    ImportSpecifier::Default { local } => leading.push(local.clone()),
                    ImportSpecifier::Namespace { local } => leading.push(format!("* as {}", local)),
                    ImportSpecifier::Named {
                        imported,
                        local,
                        kind,
                    } => {
                        let mut text = String::new();
                        if let Some(kind) = kind {
                            push_kind(*kind, &mut text);
                        }
                        text.push_str(imported);
                        if local != imported {
                            text.push_str(" as ");
                            text.push_str(local);
                        }
                        named.push(text);
                    }
                }
            }

            let mut parts = leading;
            if !named.is_empty() {
                parts.push(format!("{{ {} }}", named.join(", ")));
            }
            output.push_str(&parts.join(", "));
            output.push_str(" from ");
        }

        self.serialize_string(&import.source, output);
        output.push(';');
    }

    fn serialize_export_named(&mut self, export: &ExportNamedDeclaration, output: &mut String) {
        output.push_str("export ");

        if let Some(declaration) = &export.declaration {
            self.serialize_declaration(declaration, output);
            return;
        }

        push_kind(export.kind, output);
        let specifiers: Vec<String> = export
            .specifiers
            .iter()
            .map(|s| {
                if s.local == s.exported {
                    s.local.clone()
                } else {
                    format!("{} as {}", s.local, s.exported)
                }
            })
            .collect();

        if specifiers.is_empty() {
            output.push_str("{}");
        } else {
            output.push_str(&format!("{{ {} }}", specifiers.join(", ")));
        }

        if let Some(source) = &export.source {
            output.push_str(" from ");
            self.serialize_string(source, output);
        }
        output.push(';');
    }

    fn serialize_declaration(&mut self, declaration: &Declaration, output: &mut String) {
        match declaration {
            Declaration::TypeAlias(alias) => {
                output.push_str("type ");
                output.push_str(&alias.name);
                if let Some(params) = &alias.type_params {
                    output.push_str(params);
                }
                output.push_str(" = ");
                self.serialize_type(&alias.value, output);
                output.push(';');
            }
            Declaration::Variable(var) => {
                output.push_str(var.kind.keyword());
                output.push(' ');
                for (i, declarator) in var.declarators.iter().enumerate() {
                    if i > 0 {
                        output.push_str(", ");
                    }
                    self.serialize_declarator(declarator, output);
                }
                output.push(';');
            }
            Declaration::Verbatim(decl) => {
                output.push_str(&decl.text);
                if decl.kind == VerbatimKind::OpaqueType {
                    output.push(';');
                }
            }
        }
    }

    fn serialize_declarator(&mut self, declarator: &VariableDeclarator, output: &mut String) {
        match &declarator.id {
            BindingPattern::Identifier { name } => output.push_str(name),
            BindingPattern::Pattern { text, .. } => output.push_str(text),
        }
        if let Some(annotation) = &declarator.type_annotation {
            output.push_str(": ");
            self.serialize_type(annotation, output);
        }
        if let Some(init) = &declarator.init {
            output.push_str(" = ");
            self.serialize_expression(init, output);
        }
    }

    fn serialize_type(&mut self, annotation: &TypeAnnotation, output: &mut String) {
        match annotation {
            TypeAnnotation::Generic { name } => output.push_str(name),
            TypeAnnotation::Raw { text } => output.push_str(text),
            TypeAnnotation::Object(object) => {
                let (open, close) = if object.exact { ("{|", "|}") } else { ("{", "}") };
                if object.properties.is_empty() {
                    output.push_str(open);
                    output.push_str(close);
                    return;
                }

                output.push_str(open);
                output.push('\n');
                self.indent_level += 1;
                for property in &object.properties {
                    self.write_indent(output);
                    output.push_str(&property.key);
                    if property.optional {
                        output.push('?');
                    }
                    output.push_str(": ");
                    self.serialize_type(&property.value, output);
                    output.push_str(",\n");
                }
                self.indent_level -= 1;
                self.write_indent(output);
                output.push_str(close);
            }
        }
    }

    fn serialize_expression(&mut self, expression: &Expression, output: &mut String) {
        match expression {
            Expression::Identifier { name } => output.push_str(name),
            Expression::Raw { text } => output.push_str(text),
            Expression::Object { properties } => {
                if properties.is_empty() {
                    output.push_str("{}");
                    return;
                }

                output.push_str("{\n");
                self.indent_level += 1;
                for property in properties {
                    self.write_indent(output);
                    output.push_str(&property.key);
                    if !property.shorthand {
                        output.push_str(": ");
                        self.serialize_expression(&property.value, output);
                    }
                    output.push_str(",\n");
                }
                self.indent_level -= 1;
                self.write_indent(output);
                output.push('}');
            }
        }
    }

    fn serialize_comment(&self, comment: &Comment, output: &mut String) {
        match comment.kind {
            CommentKind::Line => {
                output.push_str("//");
                output.push_str(&comment.text);
            }
            CommentKind::Block => {
                output.push_str("/*");
                output.push_str(&comment.text);
                output.push_str("*/");
            }
        }
    }

    /// Quote a specifier, switching quote style if the preferred quote appears unescaped
    fn serialize_string(&self, value: &str, output: &mut String) {
        let preferred = self.options.quote;
        let quote = if contains_unescaped(value, preferred.char()) {
            preferred.other()
        } else {
            preferred
        };
        output.push(quote.char());
        output.push_str(value);
        output.push(quote.char());
    }

    fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.options.indent);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

fn push_kind(kind: BindingKind, output: &mut String) {
    if let Some(keyword) = kind.keyword() {
        output.push_str(keyword);
        output.push(' ');
    }
}

fn is_block_text(expression: &Expression) -> bool {
    match expression {
        Expression::Raw { text } => {
            let text = text.trim_start();
            (text.starts_with("function") || text.starts_with("class") || text.starts_with("async function"))
                && text.ends_with('}')
        }
        _ => false,
    }
}

fn contains_unescaped(value: &str, quote: char) -> bool {
    let mut escaped = false;
    for c in value.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return true;
        }
    }
    false
}

/// Serialize a module with default options
pub fn serialize(module: &Module) -> String {
    Serializer::new().serialize(module)
}

/// Serialize a module with the given options
pub fn serialize_with(module: &Module, options: SerializerOptions) -> String {
    Serializer::with_options(options).serialize(module)
}
