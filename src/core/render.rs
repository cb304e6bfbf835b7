//! Rich-text entity flattening.
//!
//! Folds a message's [`TextEntity`] list into a single Mattermost markdown
//! string, one entity at a time, in source order. Every entity kind maps to
//! exactly one rewrite rule; unknown kinds keep their text.

use crate::core::identity::IdentityResolver;
use crate::message::{EntityKind, RawMessage, TextEntity};

/// Renders message bodies with mentions resolved against the configuration.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer<'a> {
    resolver: IdentityResolver<'a>,
}

impl<'a> MarkdownRenderer<'a> {
    pub fn new(resolver: IdentityResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Renders the full body of a message.
    ///
    /// A sticker without text renders as its emoji.
    pub fn render_message(&self, msg: &RawMessage) -> String {
        let body: String = msg.entities.iter().map(|e| self.render_entity(e)).collect();
        if body.is_empty() {
            return msg.sticker_emoji.clone().unwrap_or_default();
        }
        body
    }

    /// Renders one entity.
    pub fn render_entity(&self, entity: &TextEntity) -> String {
        let text = entity.text.as_str();
        match &entity.kind {
            EntityKind::Bold => format!("**{text}**"),
            EntityKind::Italic => format!("_{text}_"),
            EntityKind::Underline => format!("**_{text}_**"),
            EntityKind::Strikethrough => format!("~~{text}~~"),
            EntityKind::Code => format!("`{text}`"),
            EntityKind::Pre { language } => {
                format!("\n```{}\n{text}\n```\n", language.as_deref().unwrap_or_default())
            }
            EntityKind::Blockquote => {
                let quoted: Vec<String> = text.lines().map(|line| format!("> {line}")).collect();
                format!("\n{}\n", quoted.join("\n"))
            }
            EntityKind::TextLink { href } => format!("[{text}]({href})"),
            EntityKind::Mention => self
                .resolver
                .mention_for_token(text)
                .unwrap_or_else(|| text.to_string()),
            EntityKind::MentionName { user_id } => {
                self.resolver.mention_for_user_id(*user_id).unwrap_or_else(|| {
                    tracing::debug!(user_id, "mention of unmapped user kept as text");
                    text.to_string()
                })
            }
            EntityKind::Other(kind) => {
                tracing::debug!(kind = %kind, "unknown text entity kept as plain text");
                text.to_string()
            }
            EntityKind::Plain
            | EntityKind::Link
            | EntityKind::Email
            | EntityKind::Phone
            | EntityKind::Hashtag
            | EntityKind::Cashtag
            | EntityKind::BotCommand
            | EntityKind::BankCard
            | EntityKind::Spoiler
            | EntityKind::CustomEmoji => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MigrationConfig;
    use crate::parsing::telegram::parse_naive_date;

    fn config() -> MigrationConfig {
        MigrationConfig::new()
            .with_user("user123", "abc")
            .with_mention("tg_bob", "bob")
    }

    fn render(config: &MigrationConfig, msg: &RawMessage) -> String {
        MarkdownRenderer::new(IdentityResolver::new(config)).render_message(msg)
    }

    fn msg() -> RawMessage {
        RawMessage::new(1, parse_naive_date("2022-03-15T06:06:11").unwrap())
    }

    #[test]
    fn test_mixed_formatting_and_mention_name() {
        let config = config();
        let msg = msg()
            .with_text("/me says ")
            .with_entity(TextEntity::new(EntityKind::Italic, "something italic"))
            .with_text(" to ")
            .with_entity(TextEntity::new(
                EntityKind::MentionName { user_id: 123 },
                "A. B. Cexample",
            ))
            .with_text(" with umläuts and ")
            .with_entity(TextEntity::new(EntityKind::Bold, "boldly emphasized"))
            .with_text(" text");

        assert_eq!(
            render(&config, &msg),
            "/me says _something italic_ to @abc with umläuts and **boldly emphasized** text"
        );
    }

    #[test]
    fn test_preformatted_block() {
        let config = config();
        let msg = msg()
            .with_text("Some multiline code snippet:\n\n")
            .with_entity(TextEntity::new(
                EntityKind::Pre { language: None },
                "foo\nbar\nfnord",
            ));

        assert_eq!(
            render(&config, &msg),
            "Some multiline code snippet:\n\n\n```\nfoo\nbar\nfnord\n```\n"
        );
    }

    #[test]
    fn test_pre_keeps_language() {
        let config = config();
        let msg = msg().with_entity(TextEntity::new(
            EntityKind::Pre {
                language: Some("rust".into()),
            },
            "fn main() {}",
        ));
        assert_eq!(render(&config, &msg), "\n```rust\nfn main() {}\n```\n");
    }

    #[test]
    fn test_span_formats() {
        let config = config();
        let renderer = MarkdownRenderer::new(IdentityResolver::new(&config));
        let cases = [
            (EntityKind::Underline, "**_x_**"),
            (EntityKind::Strikethrough, "~~x~~"),
            (EntityKind::Code, "`x`"),
            (EntityKind::Hashtag, "x"),
            (EntityKind::Spoiler, "x"),
            (EntityKind::Other("future_kind".into()), "x"),
        ];
        for (kind, expected) in cases {
            assert_eq!(renderer.render_entity(&TextEntity::new(kind, "x")), expected);
        }
    }

    #[test]
    fn test_blockquote_quotes_every_line() {
        let config = config();
        let msg = msg().with_entity(TextEntity::new(EntityKind::Blockquote, "one\ntwo"));
        assert_eq!(render(&config, &msg), "\n> one\n> two\n");
    }

    #[test]
    fn test_text_link() {
        let config = config();
        let msg = msg().with_entity(TextEntity::new(
            EntityKind::TextLink {
                href: "https://example.com".into(),
            },
            "example",
        ));
        assert_eq!(render(&config, &msg), "[example](https://example.com)");
    }

    #[test]
    fn test_mentions() {
        let config = config();
        let msg = msg()
            .with_entity(TextEntity::new(EntityKind::Mention, "@tg_bob"))
            .with_text(" and ")
            .with_entity(TextEntity::new(EntityKind::Mention, "@stranger"))
            .with_text(" and ")
            .with_entity(TextEntity::new(
                EntityKind::MentionName { user_id: 999 },
                "Somebody",
            ));
        assert_eq!(render(&config, &msg), "@bob and @stranger and Somebody");
    }

    #[test]
    fn test_sticker_emoji_body() {
        let config = config();
        let mut sticker = msg();
        sticker.sticker_emoji = Some("👍".into());
        assert_eq!(render(&config, &sticker), "👍");

        let captioned = sticker.with_text("nice");
        assert_eq!(render(&config, &captioned), "nice");
    }
}
