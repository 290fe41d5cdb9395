//! Grammar constructs built by the parser and handed to the content handler
use crate::location::CssLocation;
use crate::tokenizer::{quote_string, TokenType};
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum QuantityUnit {
    Dimen,
    Percentage,
    Length,
    Ems,
    Exs,
    Angle,
    Time,
    Freq,
    Resolution,
    Number,
    Integer,
    Rems,
}

impl QuantityUnit {
    /// Unit of the quantity a token of the given type denotes
    #[must_use]
    pub fn from_token_type(token_type: TokenType) -> Option<Self> {
        let unit = match token_type {
            TokenType::QntyDimen => QuantityUnit::Dimen,
            TokenType::QntyPercentage => QuantityUnit::Percentage,
            TokenType::QntyLength => QuantityUnit::Length,
            TokenType::QntyEms => QuantityUnit::Ems,
            TokenType::QntyExs => QuantityUnit::Exs,
            TokenType::QntyAngle => QuantityUnit::Angle,
            TokenType::QntyTime => QuantityUnit::Time,
            TokenType::QntyFreq => QuantityUnit::Freq,
            TokenType::QntyResolution => QuantityUnit::Resolution,
            TokenType::QntyRems => QuantityUnit::Rems,
            TokenType::Number => QuantityUnit::Number,
            TokenType::Integer => QuantityUnit::Integer,
            _ => return None,
        };
        Some(unit)
    }
}

/// A construct that consists of a single token's text
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Atom {
    pub value: String,
    pub location: CssLocation,
}

impl Atom {
    #[must_use]
    pub fn new(value: &str, location: CssLocation) -> Self {
        Self {
            value: value.to_string(),
            location,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Uri {
    /// Canonical token text, `url(...)` included
    pub value: String,
    pub location: CssLocation,
}

impl Uri {
    /// Returns the address without the `url(` wrapper, quotes and surrounding whitespace
    #[must_use]
    pub fn to_uri_string(&self) -> String {
        let inner = self.value.get(4..).unwrap_or_default();
        let inner = inner.strip_suffix(')').unwrap_or(inner).trim();
        let unquoted = ['\'', '"']
            .iter()
            .find_map(|q| inner.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
            .unwrap_or(inner);

        unquoted.trim().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Symbol {
    pub symbol: char,
    pub location: CssLocation,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Quantity {
    /// Number with its unit, as scanned
    pub value: String,
    pub unit: QuantityUnit,
    pub location: CssLocation,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Function {
    /// Lowercased function name, without the parenthesis
    pub name: String,
    pub components: Vec<Construct>,
    pub location: CssLocation,
}

impl Function {
    #[must_use]
    pub fn new(name: &str, location: CssLocation) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            components: Vec::new(),
            location,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ScopeKind {
    Paren,
    Bracket,
}

impl ScopeKind {
    #[must_use]
    pub fn open(&self) -> char {
        match self {
            ScopeKind::Paren => '(',
            ScopeKind::Bracket => '[',
        }
    }

    #[must_use]
    pub fn close(&self) -> char {
        match self {
            ScopeKind::Paren => ')',
            ScopeKind::Bracket => ']',
        }
    }
}

/// A parenthesized or bracketed group of component values
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScopedGroup {
    pub kind: ScopeKind,
    pub components: Vec<Construct>,
    pub location: CssLocation,
}

/// A component value of a declaration, at-rule prelude or function
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Construct {
    String(Atom),
    Keyword(Atom),
    HashName(Atom),
    UnicodeRange(Atom),
    Uri(Uri),
    Symbol(Symbol),
    Quantity(Quantity),
    Function(Function),
    ScopedGroup(ScopedGroup),
}

impl Construct {
    #[must_use]
    pub fn location(&self) -> &CssLocation {
        match self {
            Construct::String(atom)
            | Construct::Keyword(atom)
            | Construct::HashName(atom)
            | Construct::UnicodeRange(atom) => &atom.location,
            Construct::Uri(uri) => &uri.location,
            Construct::Symbol(symbol) => &symbol.location,
            Construct::Quantity(quantity) => &quantity.location,
            Construct::Function(function) => &function.location,
            Construct::ScopedGroup(group) => &group.location,
        }
    }

    /// Canonical textual form of the construct
    #[must_use]
    pub fn to_css_string(&self) -> String {
        match self {
            Construct::String(atom) => quote_string(&atom.value),
            Construct::Keyword(atom) | Construct::HashName(atom) | Construct::UnicodeRange(atom) => {
                atom.value.clone()
            }
            Construct::Uri(uri) => uri.value.clone(),
            Construct::Symbol(symbol) => symbol.symbol.to_string(),
            Construct::Quantity(quantity) => quantity.value.clone(),
            Construct::Function(function) => {
                format!("{}({})", function.name, join_arguments(&function.components))
            }
            Construct::ScopedGroup(group) => format!(
                "{}{}{}",
                group.kind.open(),
                group
                    .components
                    .iter()
                    .map(Construct::to_css_string)
                    .join(" "),
                group.kind.close()
            ),
        }
    }
}

/// Joins function arguments. Neighbours are separated by a space except around a comma and
/// before a `+` signed quantity, so that rescanning yields the same arguments.
fn join_arguments(components: &[Construct]) -> String {
    let mut css = String::new();
    let mut prev: Option<&Construct> = None;

    for component in components {
        if let Some(prev) = prev {
            if needs_separator(prev, component) {
                css.push(' ');
            }
        }
        css.push_str(&component.to_css_string());
        prev = Some(component);
    }

    css
}

fn needs_separator(prev: &Construct, next: &Construct) -> bool {
    match (prev, next) {
        (Construct::Symbol(Symbol { symbol: ',', .. }), _)
        | (_, Construct::Symbol(Symbol { symbol: ',', .. })) => false,
        (Construct::Symbol(Symbol { symbol: '\\', .. }) | Construct::UnicodeRange(_), _) => true,
        (_, Construct::Quantity(quantity)) => !quantity.value.starts_with('+'),
        _ => true,
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_css_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AtRule {
    /// Lowercased name, `@` included
    pub name: String,
    pub components: Vec<Construct>,
    pub has_block: bool,
    pub location: CssLocation,
}

impl AtRule {
    #[must_use]
    pub fn new(name: &str, location: CssLocation) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            components: Vec::new(),
            has_block: false,
            location,
        }
    }

    #[must_use]
    pub fn to_css_string(&self) -> String {
        let components = self.components.iter().map(Construct::to_css_string).join(" ");
        format!("{} {}", self.name, components).trim().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Declaration {
    /// Lowercased property name
    pub name: String,
    pub components: Vec<Construct>,
    pub important: bool,
    pub location: CssLocation,
}

impl Declaration {
    #[must_use]
    pub fn new(name: &str, location: CssLocation) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            components: Vec::new(),
            important: false,
            location,
        }
    }

    /// Renders the declaration as `name : value [!important] ;`
    #[must_use]
    pub fn to_css_string(&self) -> String {
        let mut css = format!(
            "{} : {}",
            self.name,
            self.components.iter().map(Construct::to_css_string).join(" ")
        );
        if self.important {
            css.push_str(" !important");
        }
        css.push_str(" ;");
        css
    }
}

/// Type or universal selector, with an optional namespace prefix (`ns|E`, `*|E`, `|E`)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypeSelector {
    pub name: String,
    pub location: CssLocation,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AttributeMatchKind {
    Equals,
    Includes,
    DashMatch,
    PrefixMatch,
    SuffixMatch,
    SubstringMatch,
}

impl AttributeMatchKind {
    #[must_use]
    pub fn from_token_type(token_type: TokenType) -> Option<Self> {
        match token_type {
            TokenType::Includes => Some(AttributeMatchKind::Includes),
            TokenType::DashMatch => Some(AttributeMatchKind::DashMatch),
            TokenType::PrefixMatch => Some(AttributeMatchKind::PrefixMatch),
            TokenType::SuffixMatch => Some(AttributeMatchKind::SuffixMatch),
            TokenType::SubstringMatch => Some(AttributeMatchKind::SubstringMatch),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeMatchKind::Equals => "=",
            AttributeMatchKind::Includes => "~=",
            AttributeMatchKind::DashMatch => "|=",
            AttributeMatchKind::PrefixMatch => "^=",
            AttributeMatchKind::SuffixMatch => "$=",
            AttributeMatchKind::SubstringMatch => "*=",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeMatch {
    pub kind: AttributeMatchKind,
    pub location: CssLocation,
}

/// `[name]` or `[name <match> value]`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeSelector {
    pub name: TypeSelector,
    pub matcher: Option<AttributeMatch>,
    /// Keyword or string the attribute is matched against
    pub value: Option<Construct>,
    pub location: CssLocation,
}

impl AttributeSelector {
    #[must_use]
    pub fn to_css_string(&self) -> String {
        let mut css = format!("[{}", self.name.name);
        if let Some(matcher) = &self.matcher {
            css.push_str(matcher.kind.as_str());
        }
        if let Some(value) = &self.value {
            css.push_str(&value.to_css_string());
        }
        css.push(']');
        css
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PseudoKind {
    Class,
    Element,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum PseudoArgument {
    /// Arguments of a functional pseudo class such as `:nth-child(2n+1)`
    Functional(Vec<Construct>),
    /// The simple selector of `:not(...)`
    Negation(Box<SimpleSelector>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PseudoSelector {
    pub kind: PseudoKind,
    /// Name including the leading colon(s)
    pub name: String,
    pub argument: Option<PseudoArgument>,
    pub location: CssLocation,
}

impl PseudoSelector {
    #[must_use]
    pub fn to_css_string(&self) -> String {
        match &self.argument {
            None => self.name.clone(),
            Some(PseudoArgument::Functional(components)) => {
                format!("{}({})", self.name, join_arguments(components))
            }
            Some(PseudoArgument::Negation(selector)) => {
                format!("{}({})", self.name, selector.to_css_string())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimpleSelector {
    Type(TypeSelector),
    /// `#id`
    Id(Atom),
    /// `.class`
    Class(Atom),
    Attribute(AttributeSelector),
    Pseudo(PseudoSelector),
    /// A percentage selector inside `@keyframes`
    KeyframePercentage(Quantity),
}

impl SimpleSelector {
    #[must_use]
    pub fn location(&self) -> &CssLocation {
        match self {
            SimpleSelector::Type(selector) => &selector.location,
            SimpleSelector::Id(atom) | SimpleSelector::Class(atom) => &atom.location,
            SimpleSelector::Attribute(selector) => &selector.location,
            SimpleSelector::Pseudo(selector) => &selector.location,
            SimpleSelector::KeyframePercentage(quantity) => &quantity.location,
        }
    }

    #[must_use]
    pub fn to_css_string(&self) -> String {
        match self {
            SimpleSelector::Type(selector) => selector.name.clone(),
            SimpleSelector::Id(atom) | SimpleSelector::Class(atom) => atom.value.clone(),
            SimpleSelector::Attribute(selector) => selector.to_css_string(),
            SimpleSelector::Pseudo(selector) => selector.to_css_string(),
            SimpleSelector::KeyframePercentage(quantity) => quantity.value.clone(),
        }
    }
}

/// Simple selectors that are not separated by a combinator, like `a.external:hover`
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimpleSelectorSequence {
    pub selectors: Vec<SimpleSelector>,
    pub location: CssLocation,
}

impl SimpleSelectorSequence {
    #[must_use]
    pub fn new(location: CssLocation) -> Self {
        Self {
            selectors: Vec::new(),
            location,
        }
    }

    #[must_use]
    pub fn to_css_string(&self) -> String {
        self.selectors
            .iter()
            .map(SimpleSelector::to_css_string)
            .join("")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CombinatorKind {
    /// Whitespace
    Descendant,
    /// `>`
    Child,
    /// `+`
    AdjacentSibling,
    /// `~`
    GeneralSibling,
}

impl CombinatorKind {
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '>' => Some(CombinatorKind::Child),
            '+' => Some(CombinatorKind::AdjacentSibling),
            '~' => Some(CombinatorKind::GeneralSibling),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinatorKind::Descendant => " ",
            CombinatorKind::Child => ">",
            CombinatorKind::AdjacentSibling => "+",
            CombinatorKind::GeneralSibling => "~",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Combinator {
    pub kind: CombinatorKind,
    pub location: CssLocation,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectorPart {
    Sequence(SimpleSelectorSequence),
    Combinator(Combinator),
}

/// A complex selector: simple selector sequences joined by combinators
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
    pub location: CssLocation,
}

impl Selector {
    #[must_use]
    pub fn new(location: CssLocation) -> Self {
        Self {
            parts: Vec::new(),
            location,
        }
    }

    pub fn push_sequence(&mut self, sequence: SimpleSelectorSequence) {
        self.parts.push(SelectorPart::Sequence(sequence));
    }

    pub fn push_combinator(&mut self, combinator: Combinator) {
        self.parts.push(SelectorPart::Combinator(combinator));
    }

    /// Simple selector sequences of this selector, in order
    pub fn sequences(&self) -> impl Iterator<Item = &SimpleSelectorSequence> {
        self.parts.iter().filter_map(|part| match part {
            SelectorPart::Sequence(sequence) => Some(sequence),
            SelectorPart::Combinator(_) => None,
        })
    }

    #[must_use]
    pub fn to_css_string(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                SelectorPart::Sequence(sequence) => sequence.to_css_string(),
                SelectorPart::Combinator(combinator) => combinator.kind.as_str().to_string(),
            })
            .join("")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_css_string())
    }
}
