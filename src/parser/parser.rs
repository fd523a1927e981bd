//! Parser for fact and formula files.

use std::collections::BTreeSet;
use std::sync::Arc;

use super::ast::Fact;
use super::lexer::{LexError, Lexer, Token};
use crate::domain::{Domain, DomainConfig};
use crate::interval::{Interval, Relation, SISet, SpanInterval, Time, MAX_TIME, MIN_TIME};
use crate::syntax::{Atom, ELSentence, Proposition, Sentence, TQConstraints, Term, Weight};

/// Parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            message: e.message,
            line: e.line,
            column: e.column,
        }
    }
}

/// Parser state.
struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    line: usize,
    column: usize,
    /// Whether a newline was skipped before the current token
    newline_before: bool,
    /// Hull of every region parsed so far
    hull: Option<Interval>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser {
            line: lexer.token_line,
            column: lexer.token_column,
            newline_before: lexer.newline_before,
            lexer,
            current,
            hull: None,
        })
    }

    fn advance(&mut self) -> Result<Token, ParseError> {
        let old = std::mem::replace(&mut self.current, self.lexer.next_token()?);
        self.line = self.lexer.token_line;
        self.column = self.lexer.token_column;
        self.newline_before = self.lexer.newline_before;
        Ok(old)
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current == expected {
            self.advance()?;
            Ok(())
        } else {
            Err(self.error(format!("expected {:?}, found {:?}", expected, self.current)))
        }
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            message,
            line: self.line,
            column: self.column,
        }
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(&self.current, Token::Identifier(name) if name == keyword)
    }

    /// A statement must be followed by a line break or the end of input.
    fn expect_end_of_statement(&self) -> Result<(), ParseError> {
        if self.current == Token::Eof || self.newline_before {
            Ok(())
        } else {
            Err(self.error(format!("expected end of line, found {:?}", self.current)))
        }
    }

    fn cover(&mut self, interval: Interval) {
        self.hull = Some(match self.hull {
            Some(hull) => hull.hull(&interval),
            None => interval,
        });
    }
}

/// Parse a fact file: one `[!]atom @ region` per line.
pub fn parse_facts(source: &str) -> Result<Vec<Fact>, ParseError> {
    let mut parser = Parser::new(source)?;
    parse_fact_lines(&mut parser)
}

/// Parse a formula file: one `[weight:] sentence [@ region]` per line.
pub fn parse_formulas(source: &str) -> Result<Vec<ELSentence>, ParseError> {
    let mut parser = Parser::new(source)?;
    parse_formula_lines(&mut parser)
}

/// Parse a single sentence.
pub fn parse_sentence(source: &str) -> Result<Sentence, ParseError> {
    let mut parser = Parser::new(source)?;
    let sentence = parse_implication(&mut parser)?;
    if parser.current != Token::Eof {
        return Err(parser.error(format!("unexpected {:?} after sentence", parser.current)));
    }
    Ok(Arc::try_unwrap(sentence).unwrap_or_else(|shared| (*shared).clone()))
}

/// Parse a single region such as `{[1:5], [(1, 2), (4, 6)]}`.
pub fn parse_region(source: &str) -> Result<SISet, ParseError> {
    let mut parser = Parser::new(source)?;
    let region = parse_region_set(&mut parser)?;
    if parser.current != Token::Eof {
        return Err(parser.error(format!("unexpected {:?} after region", parser.current)));
    }
    Ok(region)
}

/// Build a domain from fact and formula sources. The universe is the hull of
/// every region either source mentions.
pub fn load_domain(facts: &str, formulas: &str, config: DomainConfig) -> Result<Domain, ParseError> {
    let mut fact_parser = Parser::new(facts)?;
    let facts = parse_fact_lines(&mut fact_parser)?;
    let mut formula_parser = Parser::new(formulas)?;
    let formulas = parse_formula_lines(&mut formula_parser)?;

    let universe = match (fact_parser.hull, formula_parser.hull) {
        (Some(a), Some(b)) => a.hull(&b),
        (Some(a), None) | (None, Some(a)) => a,
        (None, None) => Interval::point(0),
    };
    let mut domain = Domain::new(universe, config);
    for fact in facts {
        domain.add_observation(fact.proposition, &fact.region);
    }
    for formula in formulas {
        domain.add_formula(formula);
    }
    Ok(domain)
}

fn parse_fact_lines(parser: &mut Parser) -> Result<Vec<Fact>, ParseError> {
    let mut facts = Vec::new();
    while parser.current != Token::Eof {
        facts.push(parse_fact(parser)?);
        parser.expect_end_of_statement()?;
    }
    Ok(facts)
}

fn parse_formula_lines(parser: &mut Parser) -> Result<Vec<ELSentence>, ParseError> {
    let mut formulas = Vec::new();
    while parser.current != Token::Eof {
        formulas.push(parse_formula(parser)?);
        parser.expect_end_of_statement()?;
    }
    Ok(formulas)
}

fn parse_fact(parser: &mut Parser) -> Result<Fact, ParseError> {
    let sign = if parser.current == Token::Not {
        parser.advance()?;
        false
    } else {
        true
    };
    let atom = parse_atom(parser)?;
    parser.expect(Token::At)?;
    let region = parse_region_set(parser)?;
    Ok(Fact {
        proposition: Proposition::new(atom, sign),
        region,
    })
}

fn parse_formula(parser: &mut Parser) -> Result<ELSentence, ParseError> {
    let weight = parse_weight(parser)?;
    let sentence = parse_implication(parser)?;
    let mut formula = ELSentence::new(sentence);
    if let Some(weight) = weight {
        formula = formula.with_weight(weight);
    }
    if parser.current == Token::At && !parser.newline_before {
        parser.advance()?;
        formula = formula.with_quantification(parse_region_set(parser)?);
    }
    Ok(formula)
}

/// An optional `N:`, `N.M:` or `inf:` prefix.
fn parse_weight(parser: &mut Parser) -> Result<Option<Weight>, ParseError> {
    let weight = match &parser.current {
        Token::Number(text) => {
            let value: f64 = text
                .parse()
                .map_err(|_| parser.error(format!("invalid weight '{}'", text)))?;
            Weight::Finite(value)
        }
        Token::Identifier(name) if name == "inf" => {
            if parser.lexer.peek_token()? != Token::Colon {
                return Ok(None);
            }
            Weight::Infinite
        }
        _ => return Ok(None),
    };
    parser.advance()?;
    parser.expect(Token::Colon)?;
    Ok(Some(weight))
}

// Implication is right-associative: p -> q -> r = p -> (q -> r)
fn parse_implication(parser: &mut Parser) -> Result<Arc<Sentence>, ParseError> {
    let left = parse_disjunction(parser)?;

    if parser.current == Token::Implies {
        parser.advance()?;
        let right = parse_implication(parser)?;
        Ok(Arc::new(Sentence::implication(left, right)))
    } else {
        Ok(left)
    }
}

fn parse_disjunction(parser: &mut Parser) -> Result<Arc<Sentence>, ParseError> {
    let mut left = parse_conjunction(parser)?;

    while parser.at_keyword("v") {
        parser.advance()?;
        let right = parse_conjunction(parser)?;
        left = Arc::new(Sentence::disjunction(left, right));
    }

    Ok(left)
}

// Conjunction binds tighter than disjunction
fn parse_conjunction(parser: &mut Parser) -> Result<Arc<Sentence>, ParseError> {
    let mut left = parse_unary(parser)?;

    loop {
        let relations = match parser.current {
            Token::And => {
                parser.advance()?;
                if parser.current == Token::LBrace {
                    parser.advance()?;
                    let relations = parse_relation_list(parser)?;
                    parser.expect(Token::RBrace)?;
                    relations
                } else {
                    Sentence::default_conjunction_relations()
                }
            }
            Token::Meets => {
                parser.advance()?;
                BTreeSet::from([Relation::Meets])
            }
            _ => return Ok(left),
        };
        let right = parse_unary(parser)?;
        left = Arc::new(Sentence::conjunction_with(left, right, relations));
    }
}

fn parse_unary(parser: &mut Parser) -> Result<Arc<Sentence>, ParseError> {
    match parser.current {
        Token::Not => {
            parser.advance()?;
            let inner = parse_unary(parser)?;
            Ok(Arc::new(Sentence::negation(inner)))
        }
        Token::Diamond => {
            parser.advance()?;
            let (relations, constraints) = if parser.current == Token::LBrace {
                parse_diamond_options(parser)?
            } else {
                (Sentence::default_diamond_relations(), None)
            };
            let inner = parse_unary(parser)?;
            Ok(Arc::new(Sentence::diamond_with(inner, relations, constraints)))
        }
        _ => parse_primary(parser),
    }
}

/// `{rels}` or `{rels:&{must be in},\{must not be in}}`.
fn parse_diamond_options(
    parser: &mut Parser,
) -> Result<(BTreeSet<Relation>, Option<TQConstraints>), ParseError> {
    parser.expect(Token::LBrace)?;
    let relations = parse_relation_list(parser)?;
    let constraints = if parser.current == Token::Colon {
        parser.advance()?;
        parser.expect(Token::Ampersand)?;
        let must_be_in = parse_region_set(parser)?;
        parser.expect(Token::Comma)?;
        parser.expect(Token::Backslash)?;
        let must_not_be_in = parse_region_set(parser)?;
        Some(TQConstraints {
            must_be_in,
            must_not_be_in,
        })
    } else {
        None
    };
    parser.expect(Token::RBrace)?;
    Ok((relations, constraints))
}

fn parse_relation_list(parser: &mut Parser) -> Result<BTreeSet<Relation>, ParseError> {
    let mut relations = BTreeSet::new();
    loop {
        let symbol = match &parser.current {
            Token::Less => "<".to_string(),
            Token::Greater => ">".to_string(),
            Token::Equals => "=".to_string(),
            Token::Identifier(name) => name.clone(),
            other => return Err(parser.error(format!("expected relation, found {:?}", other))),
        };
        let relation = symbol
            .parse::<Relation>()
            .map_err(|e| parser.error(e.to_string()))?;
        relations.insert(relation);
        parser.advance()?;
        if parser.current != Token::Comma {
            return Ok(relations);
        }
        parser.advance()?;
    }
}

fn parse_primary(parser: &mut Parser) -> Result<Arc<Sentence>, ParseError> {
    match &parser.current {
        Token::LParen => {
            parser.advance()?;
            let inner = parse_implication(parser)?;
            parser.expect(Token::RParen)?;
            Ok(inner)
        }
        Token::LBracket => {
            parser.advance()?;
            let inner = parse_implication(parser)?;
            parser.expect(Token::RBracket)?;
            Ok(Arc::new(Sentence::liquid(inner)))
        }
        Token::Identifier(name) if name == "true" || name == "false" => {
            let value = name == "true";
            parser.advance()?;
            Ok(Arc::new(Sentence::BoolLit(value)))
        }
        Token::Identifier(name) if name == "v" => {
            Err(parser.error("expected sentence, found 'v'".to_string()))
        }
        Token::Identifier(_) => Ok(Arc::new(Sentence::atom(parse_atom(parser)?))),
        other => Err(parser.error(format!("expected sentence, found {:?}", other))),
    }
}

fn parse_atom(parser: &mut Parser) -> Result<Atom, ParseError> {
    let predicate = match &parser.current {
        Token::Identifier(name) => name.clone(),
        other => return Err(parser.error(format!("expected predicate name, found {:?}", other))),
    };
    parser.advance()?;

    let mut args = Vec::new();
    if parser.current == Token::LParen {
        parser.advance()?;
        if parser.current != Token::RParen {
            args.push(parse_term(parser)?);
            while parser.current == Token::Comma {
                parser.advance()?;
                args.push(parse_term(parser)?);
            }
        }
        parser.expect(Token::RParen)?;
    }
    Ok(Atom::new(predicate, args))
}

fn parse_term(parser: &mut Parser) -> Result<Term, ParseError> {
    let term = match &parser.current {
        Token::Identifier(name) => Term::from_name(name.clone()),
        Token::Number(text) => Term::constant(text.clone()),
        other => return Err(parser.error(format!("expected term, found {:?}", other))),
    };
    parser.advance()?;
    Ok(term)
}

/// A region: `{span, ...}` or a single span.
fn parse_region_set(parser: &mut Parser) -> Result<SISet, ParseError> {
    let mut spans = Vec::new();
    if parser.current == Token::LBrace {
        parser.advance()?;
        if parser.current != Token::RBrace {
            spans.push(parse_span(parser)?);
            while parser.current == Token::Comma {
                parser.advance()?;
                spans.push(parse_span(parser)?);
            }
        }
        parser.expect(Token::RBrace)?;
    } else {
        spans.push(parse_span(parser)?);
    }

    let max = spans
        .iter()
        .map(SpanInterval::universe)
        .reduce(|a, b| a.hull(&b))
        .or(parser.hull)
        .unwrap_or(Interval::point(0));
    Ok(SISet::from_spans(spans, false, max))
}

/// `[a:b]` or `[(a, b), (c, d)]`.
fn parse_span(parser: &mut Parser) -> Result<SpanInterval, ParseError> {
    parser.expect(Token::LBracket)?;
    let (start_from, start_to, finish_from, finish_to) = if parser.current == Token::LParen {
        let (a, b) = parse_pair(parser)?;
        parser.expect(Token::Comma)?;
        let (c, d) = parse_pair(parser)?;
        (a, b, c, d)
    } else {
        let a = parse_time(parser)?;
        parser.expect(Token::Colon)?;
        let b = parse_time(parser)?;
        (a, b, a, b)
    };
    parser.expect(Token::RBracket)?;

    if start_from > start_to || finish_from > finish_to || start_from > finish_to {
        return Err(parser.error(format!(
            "empty region [({}, {}), ({}, {})]",
            start_from, start_to, finish_from, finish_to
        )));
    }
    let universe = Interval::new(start_from.min(finish_from), start_to.max(finish_to));
    parser.cover(universe);
    Ok(SpanInterval::new(
        start_from,
        start_to,
        finish_from,
        finish_to,
        universe,
    ))
}

fn parse_pair(parser: &mut Parser) -> Result<(Time, Time), ParseError> {
    parser.expect(Token::LParen)?;
    let a = parse_time(parser)?;
    parser.expect(Token::Comma)?;
    let b = parse_time(parser)?;
    parser.expect(Token::RParen)?;
    Ok((a, b))
}

fn parse_time(parser: &mut Parser) -> Result<Time, ParseError> {
    let time = match &parser.current {
        Token::Number(text) => text
            .parse::<Time>()
            .map_err(|_| parser.error(format!("invalid time point '{}'", text)))?,
        other => return Err(parser.error(format!("expected time point, found {:?}", other))),
    };
    if !(MIN_TIME..=MAX_TIME).contains(&time) {
        return Err(parser.error(format!(
            "time point {} is out of range [{}, {}]",
            time, MIN_TIME, MAX_TIME
        )));
    }
    parser.advance()?;
    Ok(time)
}
