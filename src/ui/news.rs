//! News section rendering

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::Remote;
use crate::data::{NewsArticle, NewsTopic};
use crate::theme::Palette;

pub fn render(
    topic: NewsTopic,
    remote: Option<&Remote<Vec<NewsArticle>>>,
    area: Rect,
    buf: &mut Buffer,
    palette: &Palette,
) {
    let block = Block::default()
        .title(format!(" {} ", topic.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border));

    let muted = Style::default().fg(palette.muted);
    let lines = match remote {
        None | Some(Remote::Loading) => vec![Line::from(Span::styled(
            "Loading news...",
            Style::default().fg(palette.accent),
        ))],
        Some(Remote::Empty) => vec![Line::from(Span::styled(
            "No news articles available.",
            muted,
        ))],
        Some(Remote::Failed(message)) => vec![
            Line::from(Span::styled(
                "Error loading news articles.",
                Style::default().fg(palette.error).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(message.clone(), muted)),
            Line::from(""),
            Line::from(Span::styled("Press r to retry", muted)),
        ],
        Some(Remote::Loaded(articles)) => article_lines(articles, palette),
    };

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block)
        .render(area, buf);
}

fn article_lines<'a>(articles: &'a [NewsArticle], palette: &Palette) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for (i, article) in articles.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            article.title.as_str(),
            Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
        )));
        if let Some(description) = article.description.as_deref() {
            lines.push(Line::from(Span::styled(
                description,
                Style::default().fg(palette.muted),
            )));
        }
        lines.push(Line::from(Span::styled(
            article.url.as_str(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::UNDERLINED),
        )));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn content(buf: &Buffer) -> String {
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_articles_render_title_and_link() {
        let articles = vec![
            NewsArticle {
                title: "Flood warning issued".into(),
                description: Some("Rivers expected to crest".into()),
                url: "https://example.com/flood".into(),
            },
            NewsArticle {
                title: "Levee holds".into(),
                description: None,
                url: "https://example.com/levee".into(),
            },
        ];
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);

        render(
            NewsTopic::Flood,
            Some(&Remote::Loaded(articles)),
            area,
            &mut buf,
            &Theme::Light.palette(),
        );

        let text = content(&buf);
        assert!(text.contains("Flood News"));
        assert!(text.contains("Flood warning issued"));
        assert!(text.contains("https://example.com/levee"));
    }

    #[test]
    fn test_empty_and_error_states() {
        let area = Rect::new(0, 0, 60, 8);
        let palette = Theme::Light.palette();

        let mut empty = Buffer::empty(area);
        render(NewsTopic::Storm, Some(&Remote::Empty), area, &mut empty, &palette);
        assert!(content(&empty).contains("No news articles available."));

        let mut failed = Buffer::empty(area);
        render(
            NewsTopic::Storm,
            Some(&Remote::Failed("status 503".into())),
            area,
            &mut failed,
            &palette,
        );
        assert!(content(&failed).contains("Error loading news articles."));
    }
}
