//! Java types as far as the analyses need them
//!
//! Types are parsed from their source spelling. Generic arguments are kept
//! for display but never checked; annotations on types are dropped.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn from_keyword(keyword: &str) -> Option<PrimitiveType> {
        Some(match keyword {
            "boolean" => PrimitiveType::Boolean,
            "byte" => PrimitiveType::Byte,
            "short" => PrimitiveType::Short,
            "char" => PrimitiveType::Char,
            "int" => PrimitiveType::Int,
            "long" => PrimitiveType::Long,
            "float" => PrimitiveType::Float,
            "double" => PrimitiveType::Double,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Box class in `java.lang`
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::Byte => "Byte",
            PrimitiveType::Short => "Short",
            PrimitiveType::Char => "Character",
            PrimitiveType::Int => "Integer",
            PrimitiveType::Long => "Long",
            PrimitiveType::Float => "Float",
            PrimitiveType::Double => "Double",
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Char
                | PrimitiveType::Int
                | PrimitiveType::Long
        )
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, PrimitiveType::Float | PrimitiveType::Double)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integral() || self.is_floating_point()
    }

    /// Position in the widening order `byte < short < int < long < float < double`.
    /// `char` sits beside `short`; the two never widen into each other.
    fn rank(self) -> u8 {
        match self {
            PrimitiveType::Boolean => 0,
            PrimitiveType::Byte => 1,
            PrimitiveType::Short | PrimitiveType::Char => 2,
            PrimitiveType::Int => 3,
            PrimitiveType::Long => 4,
            PrimitiveType::Float => 5,
            PrimitiveType::Double => 6,
        }
    }

    /// Whether a value of `source` converts to `self` by identity or widening
    pub fn widens_from(self, source: PrimitiveType) -> bool {
        if self == source {
            return true;
        }
        if !self.is_numeric() || !source.is_numeric() {
            return false;
        }
        match (source, self) {
            (PrimitiveType::Char, PrimitiveType::Short | PrimitiveType::Byte) => false,
            (PrimitiveType::Byte | PrimitiveType::Short, PrimitiveType::Char) => false,
            _ => source.rank() < self.rank(),
        }
    }

    /// Binary numeric promotion (JLS 5.6.2)
    pub fn promote(self, other: PrimitiveType) -> Option<PrimitiveType> {
        if !self.is_numeric() || !other.is_numeric() {
            return None;
        }
        let widest = if self.rank() >= other.rank() { self } else { other };
        Some(match widest {
            PrimitiveType::Double | PrimitiveType::Float | PrimitiveType::Long => widest,
            _ => PrimitiveType::Int,
        })
    }

    /// Unary numeric promotion (JLS 5.6.1)
    pub fn promote_unary(self) -> Option<PrimitiveType> {
        self.promote(PrimitiveType::Int)
    }
}

/// A Java type reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JavaType {
    Primitive { primitive: PrimitiveType },
    /// Class or interface type, `name` as spelled (simple or qualified)
    Class { name: String, args: Vec<JavaType> },
    Array { element: Box<JavaType> },
    /// `var` in a local declaration, to be inferred from the initializer
    Var,
    Void,
    Null,
    Unknown,
}

impl JavaType {
    pub fn primitive(primitive: PrimitiveType) -> JavaType {
        JavaType::Primitive { primitive }
    }

    pub fn class(name: impl Into<String>) -> JavaType {
        JavaType::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn array_of(element: JavaType) -> JavaType {
        JavaType::Array {
            element: Box::new(element),
        }
    }

    pub fn string() -> JavaType {
        JavaType::class("String")
    }

    /// Parse a type from its source spelling, e.g. `int`, `long[]`,
    /// `java.util.Map<K, List<V>>`, `@NonNull String`, `String...`.
    pub fn parse(text: &str) -> JavaType {
        let cleaned = strip_annotations(text);
        let mut spelling = cleaned.trim();
        if spelling.is_empty() {
            return JavaType::Unknown;
        }

        // Union catch types: only the first alternative is kept
        if let Some(first) = split_top_level(spelling, '|').into_iter().next() {
            if first.len() != spelling.len() {
                return JavaType::parse(first);
            }
        }

        let mut dimensions = 0;
        if let Some(stripped) = spelling.strip_suffix("...") {
            spelling = stripped.trim_end();
            dimensions += 1;
        }
        loop {
            let trimmed = spelling.trim_end();
            match trimmed.strip_suffix(']') {
                Some(rest) => {
                    let rest = rest.trim_end();
                    match rest.strip_suffix('[') {
                        Some(inner) => {
                            spelling = inner;
                            dimensions += 1;
                        }
                        None => return JavaType::Unknown,
                    }
                }
                None => {
                    spelling = trimmed;
                    break;
                }
            }
        }

        let mut base = parse_base(spelling);
        for _ in 0..dimensions {
            base = JavaType::array_of(base);
        }
        base
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            JavaType::Primitive { primitive } => Some(*primitive),
            _ => None,
        }
    }

    /// Primitive type of a primitive or of its `java.lang` box
    pub fn unboxed(&self) -> Option<PrimitiveType> {
        match self {
            JavaType::Primitive { primitive } => Some(*primitive),
            JavaType::Class { name, .. } => {
                let simple = name.strip_prefix("java.lang.").unwrap_or(name);
                [
                    PrimitiveType::Boolean,
                    PrimitiveType::Byte,
                    PrimitiveType::Short,
                    PrimitiveType::Char,
                    PrimitiveType::Int,
                    PrimitiveType::Long,
                    PrimitiveType::Float,
                    PrimitiveType::Double,
                ]
                .into_iter()
                .find(|p| p.boxed_name() == simple)
            }
            _ => None,
        }
    }

    pub fn is_integral(&self) -> bool {
        self.as_primitive().is_some_and(PrimitiveType::is_integral)
    }

    /// `float`, `double` or their boxes
    pub fn is_floating_point(&self) -> bool {
        self.unboxed().is_some_and(PrimitiveType::is_floating_point)
    }

    pub fn is_boolean(&self) -> bool {
        self.unboxed() == Some(PrimitiveType::Boolean)
    }

    pub fn is_string(&self) -> bool {
        matches!(self.erasure(), Some("String" | "java.lang.String"))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, JavaType::Void)
    }

    /// Class name without type arguments
    pub fn erasure(&self) -> Option<&str> {
        match self {
            JavaType::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Last segment of the class name
    pub fn simple_name(&self) -> Option<&str> {
        self.erasure()
            .map(|name| name.rsplit('.').next().unwrap_or(name))
    }

    /// Whether `source` can be assigned to a variable of this type without a
    /// cast, for the primitive and boxed cases the loop recognizer needs.
    /// Reference types are assumed compatible with each other.
    pub fn is_assignment_compatible(&self, source: &JavaType) -> bool {
        match (self, source) {
            (JavaType::Primitive { primitive: target }, _) => match source.unboxed() {
                Some(source) => target.widens_from(source),
                None => false,
            },
            (JavaType::Class { .. }, JavaType::Primitive { primitive }) => {
                self.unboxed() == Some(*primitive)
            }
            (JavaType::Class { .. } | JavaType::Array { .. }, JavaType::Null) => true,
            (JavaType::Unknown, _) | (_, JavaType::Unknown) => true,
            (JavaType::Void, _) | (_, JavaType::Void) => false,
            _ => true,
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Primitive { primitive } => f.write_str(primitive.keyword()),
            JavaType::Class { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
                    write!(f, "<{}>", rendered.join(", "))?;
                }
                Ok(())
            }
            JavaType::Array { element } => write!(f, "{}[]", element),
            JavaType::Var => f.write_str("var"),
            JavaType::Void => f.write_str("void"),
            JavaType::Null => f.write_str("null"),
            JavaType::Unknown => f.write_str("?"),
        }
    }
}

fn parse_base(spelling: &str) -> JavaType {
    match spelling {
        "var" => return JavaType::Var,
        "void" => return JavaType::Void,
        "?" => return JavaType::Unknown,
        _ => {}
    }
    if let Some(primitive) = PrimitiveType::from_keyword(spelling) {
        return JavaType::primitive(primitive);
    }
    if let Some(bound) = spelling
        .strip_prefix("? extends ")
        .or_else(|| spelling.strip_prefix("? super "))
    {
        return JavaType::parse(bound);
    }

    let (name, args) = match spelling.find('<') {
        Some(open) if spelling.ends_with('>') => {
            let inner = &spelling[open + 1..spelling.len() - 1];
            let args = split_top_level(inner, ',')
                .into_iter()
                .filter(|a| !a.trim().is_empty())
                .map(JavaType::parse)
                .collect();
            (spelling[..open].trim(), args)
        }
        Some(_) => return JavaType::Unknown,
        None => (spelling, Vec::new()),
    };

    // `Outer<T>.Inner` keeps only the plain dotted name
    let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.') {
        return JavaType::Unknown;
    }
    JavaType::Class { name, args }
}

/// Split on `separator` outside of angle brackets
fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(text[start..index].trim());
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

fn strip_annotations(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '@' {
            result.push(c);
            continue;
        }
        // skip the annotation name and an optional argument list
        while let Some(&next) = chars.peek() {
            if next.is_alphanumeric() || next == '.' || next == '_' {
                chars.next();
            } else {
                break;
            }
        }
        if chars.peek() == Some(&'(') {
            let mut depth = 0;
            for next in chars.by_ref() {
                match next {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    result
}
