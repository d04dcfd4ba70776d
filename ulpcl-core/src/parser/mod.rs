//! Two-phase parser over a [`TokenStream`] (`spec.md` §4.3).
//!
//! The static phase consumes the mandatory `@language`/`@lcid` header,
//! the `{ ... }` global section, an optional `@meta { ... }` block, and
//! validates the `@content { ... }` envelope. The dynamic phase then
//! recursively parses the groups and messages inside `@content` into a
//! [`ParseTree`].

mod name;

use crate::diagnostics::{Code, Diagnostic, Handler};
use crate::keyword::Keyword;
use crate::location::TokenLocation;
use crate::options::CompileOptions;
use crate::token::{Token, TokenStream, TokenType};
use crate::tree::{Group, GroupLike, Message, ParseTree};

const LCID_MAX: u32 = 0x7FFF_FFFF;

fn parse_lcid_digits(text: &str) -> Option<u32> {
    let mut value: u32 = 0;
    if text.is_empty() {
        return None;
    }
    for b in text.bytes() {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value.checked_mul(10)?.checked_add((b - b'0') as u32)?;
        if value > LCID_MAX {
            return None;
        }
    }
    Some(value)
}

struct Ctx<'a, 'h> {
    stream: &'a TokenStream,
    off: usize,
    handler: &'a mut Handler<'h>,
    options: CompileOptions,
}

impl<'a, 'h> Ctx<'a, 'h> {
    /// Matches the original implementation's headroom check: not a literal
    /// token count, but `len - off - 1`, used only for "are there at least
    /// N more tokens before the stream's reserved final token" guards.
    fn remaining(&self) -> usize {
        self.stream.len().saturating_sub(self.off).saturating_sub(1)
    }

    fn current(&self) -> &'a Token {
        self.stream.get(self.off).expect("offset in bounds")
    }

    fn advance(&mut self) -> &'a Token {
        let tok = self.stream.get(self.off).expect("offset in bounds");
        self.off += 1;
        tok
    }

    fn is_keyword(&self, token: &Token, keyword: Keyword) -> bool {
        matches!(token.kind, TokenType::Keyword(k) if k == keyword)
    }

    fn error(&mut self, code: Code, location: TokenLocation, text: impl Into<String>) {
        self.handler
            .record(Diagnostic::error(code, text).with_location(location));
    }
}

// ---- static phase ----

fn parse_language(ctx: &mut Ctx, tree: &mut ParseTree) -> bool {
    if ctx.remaining() < 3 {
        let loc = ctx.current().location;
        ctx.error(
            Code::E2000UndefinedSymbol,
            loc,
            "undefined symbol '@language' which is required",
        );
        return false;
    }

    let first = ctx.advance().clone();
    if !ctx.is_keyword(&first, Keyword::Language) {
        ctx.error(
            Code::E2000UndefinedSymbol,
            first.location,
            "undefined symbol '@language' which is required",
        );
        return false;
    }

    let second = ctx.advance().clone();
    let third = ctx.advance().clone();
    if second.kind != TokenType::Colon || third.kind != TokenType::StringLiteral {
        ctx.error(
            Code::E2006InvalidKeywordUsage,
            first.location,
            "invalid usage of the '@language' keyword",
        );
        return false;
    }

    if third.text.len() > 255 {
        ctx.error(
            Code::E1003LanguageNameTooLong,
            third.location,
            format!(
                "language name '{}' is {} UTF-8 bytes, exceeding the 255-byte limit",
                third.text,
                third.text.len()
            ),
        );
        return false;
    }

    tree.language = third.text;
    true
}

fn parse_lcid(ctx: &mut Ctx, tree: &mut ParseTree) -> bool {
    if ctx.remaining() < 3 {
        let loc = ctx.current().location;
        ctx.error(
            Code::E2000UndefinedSymbol,
            loc,
            "undefined symbol '@lcid' which is required",
        );
        return false;
    }

    let first = ctx.advance().clone();
    if !ctx.is_keyword(&first, Keyword::Lcid) {
        ctx.error(
            Code::E2000UndefinedSymbol,
            first.location,
            "undefined symbol '@lcid' which is required",
        );
        return false;
    }

    let second = ctx.advance().clone();
    let third = ctx.advance().clone();
    if second.kind != TokenType::Colon || third.kind != TokenType::StringLiteral {
        ctx.error(
            Code::E2006InvalidKeywordUsage,
            first.location,
            "invalid usage of the '@lcid' keyword",
        );
        return false;
    }

    match parse_lcid_digits(&third.text) {
        Some(value) => {
            tree.lcid = value;
            true
        }
        None => {
            ctx.error(Code::E2011InvalidLcid, third.location, "invalid '@lcid' value");
            false
        }
    }
}

fn skip_meta(ctx: &mut Ctx) -> bool {
    let location = ctx.advance().location; // '@meta'
    if ctx.advance().kind != TokenType::LeftBrace {
        ctx.error(
            Code::E2003InvalidContentEnvelope,
            location,
            "missing opening bracket '{' for group '@meta'",
        );
        return false;
    }

    let max_off = ctx.stream.len() - 1;
    while ctx.off < max_off {
        let token = ctx.advance().clone();
        if ctx.is_keyword(&token, Keyword::Content) {
            break;
        } else if token.kind == TokenType::RightBrace {
            return true;
        }
    }

    ctx.error(
        Code::E2004UnterminatedScope,
        location,
        "missing closing bracket '}' for group '@meta'",
    );
    false
}

fn validate_content(ctx: &mut Ctx) -> bool {
    if ctx.remaining() < 3 {
        let loc = ctx.current().location;
        ctx.error(
            Code::E2000UndefinedSymbol,
            loc,
            "undefined symbol '@content' which is required",
        );
        return false;
    }

    let first = ctx.advance().clone();
    if !ctx.is_keyword(&first, Keyword::Content) {
        ctx.error(
            Code::E2000UndefinedSymbol,
            first.location,
            "undefined symbol '@content' which is required",
        );
        return false;
    }

    if ctx.advance().kind != TokenType::LeftBrace {
        ctx.error(
            Code::E2003InvalidContentEnvelope,
            first.location,
            "missing opening bracket '{' for group '@content'",
        );
        return false;
    }

    if ctx.stream.get(ctx.stream.len() - 2).map(|t| t.kind) != Some(TokenType::RightBrace) {
        ctx.error(
            Code::E2004UnterminatedScope,
            first.location,
            "missing closing bracket '}' for group '@content'",
        );
        return false;
    }

    true
}

fn parse_static(ctx: &mut Ctx, tree: &mut ParseTree) -> bool {
    if !parse_language(ctx, tree) || !parse_lcid(ctx, tree) {
        return false;
    }

    if ctx.remaining() < 2 {
        let token = ctx.current().clone();
        if token.kind != TokenType::LeftBrace {
            ctx.error(
                Code::E2001MissingOpeningBrace,
                token.location,
                "missing opening bracket '{' for the global section",
            );
        } else {
            let loc = ctx.stream.get(ctx.stream.len() - 1).unwrap().location;
            ctx.error(
                Code::E2002MissingClosingBrace,
                loc,
                "missing closing bracket '}' for the global section",
            );
        }
        return false;
    }

    {
        let token = ctx.advance().clone();
        if token.kind != TokenType::LeftBrace {
            ctx.error(
                Code::E2001MissingOpeningBrace,
                token.location,
                "missing opening bracket '{' for the global section",
            );
            return false;
        }
    }

    {
        let last = ctx.stream.get(ctx.stream.len() - 1).unwrap();
        if last.kind != TokenType::RightBrace {
            let loc = last.location;
            ctx.error(
                Code::E2002MissingClosingBrace,
                loc,
                "missing closing bracket '}' for the global section",
            );
            return false;
        }
    }

    if ctx.remaining() > 0 {
        let current = ctx.current().clone();
        if ctx.is_keyword(&current, Keyword::Meta) && !skip_meta(ctx) {
            return false;
        }
    }

    validate_content(ctx)
}

// ---- dynamic phase ----

fn append_group<G: GroupLike>(group: &mut G, name: &str) -> bool {
    if !name::is_group_name_unique(group.groups(), name) {
        return false;
    }
    group.groups_mut().push(Group::new(name));
    true
}

fn append_message<G: GroupLike>(group: &mut G, id: &str, value: String) -> bool {
    if !name::is_identifier_name_unique(group.messages(), id) {
        return false;
    }
    group.messages_mut().push(Message {
        id: id.to_string(),
        value,
    });
    true
}

fn parse_message<G: GroupLike>(ctx: &mut Ctx, group: &mut G) -> bool {
    if ctx.remaining() < 3 {
        let token = ctx.current().clone();
        ctx.error(
            Code::E2005IncompleteMessage,
            token.location,
            format!("incomplete message '{}'", token.text),
        );
        return false;
    }

    let first = ctx.advance().clone();
    if !name::is_valid_identifier_name(&first.text) {
        ctx.error(
            Code::E2010InvalidMessageId,
            first.location,
            format!("illegal identifier name '{}'", first.text),
        );
        return false;
    }

    let second = ctx.advance().clone();
    let third = ctx.advance().clone();
    if second.kind != TokenType::Colon || third.kind != TokenType::StringLiteral {
        ctx.error(
            Code::E2005IncompleteMessage,
            first.location,
            format!("incomplete message '{}'", first.text),
        );
        return false;
    }

    let max_off = ctx.stream.len() - 2;
    let mut value = third.text;
    while ctx.off < max_off {
        let token = ctx.current();
        if token.kind != TokenType::StringLiteral {
            break;
        }
        value.push('\n');
        value.push_str(&token.text.clone());
        ctx.off += 1;
    }

    let empty = value.is_empty();
    if empty {
        ctx.handler.record_conditional(
            Code::E2014EmptyMessageValue,
            Code::W2001EmptyMessageValue,
            format!("message '{}' has an empty value", first.text),
            Some(third.location),
        );
        if ctx.options.model == crate::diagnostics::ErrorModel::Strict {
            return false;
        }
        if ctx.options.discard_empty_messages {
            return true;
        }
    }

    if !append_message(group, &first.text, value) {
        ctx.error(
            Code::E2008DuplicateMessageId,
            first.location,
            format!("ambiguous identifier name, '{}' is already defined", first.text),
        );
        return false;
    }

    true
}

fn parse_group<G: GroupLike>(ctx: &mut Ctx, parent: &mut G, location: TokenLocation) -> bool {
    if ctx.remaining() < 4 {
        ctx.error(
            Code::E2006InvalidKeywordUsage,
            location,
            "invalid usage of the '@group' keyword",
        );
        return false;
    }

    if ctx.advance().kind != TokenType::Colon {
        ctx.error(
            Code::E2006InvalidKeywordUsage,
            location,
            "invalid usage of the '@group' keyword",
        );
        return false;
    }

    let name_token = ctx.advance().clone();
    if name_token.kind != TokenType::StringLiteral {
        ctx.error(
            Code::E2006InvalidKeywordUsage,
            location,
            "invalid usage of the '@group' keyword",
        );
        return false;
    }

    if !name::is_valid_group_name(&name_token.text) {
        ctx.error(
            Code::E2009InvalidGroupName,
            name_token.location,
            format!("illegal group name '{}'", name_token.text),
        );
        return false;
    }

    if ctx.advance().kind != TokenType::LeftBrace {
        ctx.error(
            Code::E2003InvalidContentEnvelope,
            location,
            format!("missing opening bracket '{{' for group '{}'", name_token.text),
        );
        return false;
    }

    if !append_group(parent, &name_token.text) {
        ctx.error(
            Code::E2007DuplicateGroupName,
            name_token.location,
            format!("ambiguous group name, '{}' is already defined", name_token.text),
        );
        return false;
    }

    let max_off = ctx.stream.len() - 2;
    loop {
        if ctx.off >= max_off {
            ctx.error(
                Code::E2004UnterminatedScope,
                location,
                format!("missing closing bracket '}}' for group '{}'", name_token.text),
            );
            return false;
        }

        let token = ctx.current().clone();
        match token.kind {
            TokenType::Keyword(Keyword::Group) => {
                ctx.off += 1;
                let child = parent.groups_mut().last_mut().expect("group just appended");
                if !parse_group(ctx, child, token.location) {
                    return false;
                }
            }
            TokenType::Keyword(_) => {
                ctx.error(
                    Code::E2006InvalidKeywordUsage,
                    token.location,
                    format!("invalid usage of the '{}' keyword", token.text),
                );
                return false;
            }
            TokenType::Identifier => {
                let child = parent.groups_mut().last_mut().expect("group just appended");
                if !parse_message(ctx, child) {
                    return false;
                }
            }
            TokenType::RightBrace => {
                let this_group = parent.groups().last().expect("group just appended");
                if this_group.messages.is_empty() && this_group.groups.is_empty() {
                    ctx.handler.record_conditional(
                        Code::E2015EmptyGroup,
                        Code::W2002EmptyGroup,
                        format!("group '{}' has no members", name_token.text),
                        Some(location),
                    );
                    if ctx.options.model == crate::diagnostics::ErrorModel::Strict {
                        return false;
                    }
                }
                ctx.off += 1;
                return true;
            }
            _ => {
                ctx.error(
                    Code::E2012UnexpectedToken,
                    token.location,
                    format!("unexpected token '{}'", token.text),
                );
                return false;
            }
        }
    }
}

fn parse_dynamic(ctx: &mut Ctx, tree: &mut ParseTree) -> bool {
    let max_off = ctx.stream.len() - 2;
    while ctx.off < max_off {
        let token = ctx.current().clone();
        match token.kind {
            TokenType::Keyword(Keyword::Group) => {
                ctx.off += 1;
                if !parse_group(ctx, &mut tree.content, token.location) {
                    return false;
                }
            }
            TokenType::Keyword(_) => {
                ctx.error(
                    Code::E2006InvalidKeywordUsage,
                    token.location,
                    format!("invalid usage of the '{}' keyword", token.text),
                );
                return false;
            }
            TokenType::Identifier => {
                if !parse_message(ctx, &mut tree.content) {
                    return false;
                }
            }
            _ => {
                ctx.error(
                    Code::E2012UnexpectedToken,
                    token.location,
                    format!("unexpected token '{}'", token.text),
                );
                return false;
            }
        }
    }
    true
}

/// Runs both parser phases over `stream`, producing a [`ParseTree`].
/// `pack_name` is used only in the empty-content diagnostic's text.
pub fn parse(
    stream: &TokenStream,
    pack_name: &str,
    handler: &mut Handler<'_>,
    options: CompileOptions,
) -> Option<ParseTree> {
    if stream.is_empty() {
        handler.record(Diagnostic::error(
            Code::E2000UndefinedSymbol,
            "undefined symbol '@language' which is required",
        ));
        return None;
    }

    let mut tree = ParseTree::default();
    let mut ctx = Ctx {
        stream,
        off: 0,
        handler,
        options,
    };

    if !parse_static(&mut ctx, &mut tree) {
        return None;
    }
    if !parse_dynamic(&mut ctx, &mut tree) {
        return None;
    }

    if tree.content.messages.is_empty() && tree.content.groups.is_empty() {
        ctx.handler.record_conditional(
            Code::E2013EmptyContent,
            Code::W2000EmptyContent,
            format!("pack '{}' has no messages or groups", pack_name),
            None,
        );
        if ctx.options.model == crate::diagnostics::ErrorModel::Strict {
            return None;
        }
    }

    Some(tree)
}
