//! Web search tool — stub that returns mock search results.
//!
//! In production this would call a real search API (Brave, Google, etc.).
//! The stub returns plausible, deterministic results so the reasoning loop
//! can be exercised end-to-end without network access.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::tool::{Tool, ToolParams, ToolResult};

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns relevant results with titles, \
URLs, and snippets.\n\n\
Parameters:\n\
- query (str): the search query\n\
- num_results (int, optional): number of results, default 3\n\n\
Example: query=rust async runtime"
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult, ToolError> {
        let query = params
            .get("query")
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' parameter".into()))?;

        let num_results = params
            .get("num_results")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(3)
            .clamp(1, 5);

        let results = mock_results(query, num_results);

        let mut lines = vec![format!("Search results for '{query}':")];
        for (i, r) in results.iter().enumerate() {
            lines.push(format!("{}. {} — {} ({})", i + 1, r.title, r.snippet, r.url));
        }

        let mut metadata = serde_json::Map::new();
        metadata.insert("result_count".into(), serde_json::json!(results.len()));

        Ok(ToolResult::ok_with_metadata(lines.join("\n"), metadata))
    }
}

struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

/// Deterministic mock results keyed on query content.
fn mock_results(query: &str, count: usize) -> Vec<SearchResult> {
    let q = query.to_lowercase();

    let mut results: Vec<SearchResult> = if q.contains("weather") {
        vec![
            SearchResult {
                title: "Current Weather Conditions".into(),
                url: "https://weather.example.com/current".into(),
                snippet: "Partly cloudy, 18°C, light westerly wind.".into(),
            },
            SearchResult {
                title: "10-Day Forecast".into(),
                url: "https://weather.example.com/forecast".into(),
                snippet: "Mild temperatures expected through the week with scattered showers.".into(),
            },
            SearchResult {
                title: "Weather Maps and Radar".into(),
                url: "https://weather.example.com/radar".into(),
                snippet: "Interactive radar and satellite imagery, updated every 10 minutes.".into(),
            },
        ]
    } else if q.contains("news") {
        vec![
            SearchResult {
                title: "Top Headlines".into(),
                url: "https://news.example.com/headlines".into(),
                snippet: "The latest breaking news and top stories from around the world.".into(),
            },
            SearchResult {
                title: "Technology News".into(),
                url: "https://news.example.com/tech".into(),
                snippet: "Coverage of software, hardware, and the companies behind them.".into(),
            },
            SearchResult {
                title: "Business and Markets".into(),
                url: "https://news.example.com/business".into(),
                snippet: "Market movements, earnings reports, and economic analysis.".into(),
            },
        ]
    } else {
        (1..=count.max(1))
            .map(|i| SearchResult {
                title: format!("Result {i} for \"{query}\""),
                url: format!("https://search.example.com/{}/{i}", slug(&q)),
                snippet: format!("An overview of {query}, including background and key facts."),
            })
            .collect()
    };

    results.truncate(count);
    results
}

fn slug(q: &str) -> String {
    q.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ToolParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn returns_requested_number_of_results() {
        let tool = WebSearchTool;
        let result = tool
            .execute(&params(&[("query", "rust programming"), ("num_results", "2")]))
            .await
            .unwrap();
        assert!(result.success);
        assert!(result.content.contains("1."));
        assert!(result.content.contains("2."));
        assert!(!result.content.contains("3."));
    }

    #[tokio::test]
    async fn results_are_deterministic() {
        let tool = WebSearchTool;
        let p = params(&[("query", "weather in oslo")]);
        let a = tool.execute(&p).await.unwrap();
        let b = tool.execute(&p).await.unwrap();
        assert_eq!(a.content, b.content);
        assert!(a.content.contains("Weather"));
    }

    #[tokio::test]
    async fn missing_query_is_invalid_arguments() {
        let tool = WebSearchTool;
        assert!(tool.execute(&ToolParams::new()).await.is_err());
    }
}
