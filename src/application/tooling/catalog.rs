use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use super::error::ToolServiceError;
use super::interface::{ToolCatalog, ToolDefinition, ToolQuery};
use crate::types::ToolSpec;

const PAGE_SIZE: usize = 50;

/// The tools available to the agent, indexed by the function name the model uses.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolSet {
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        let index = tools
            .iter()
            .enumerate()
            .map(|(position, tool)| (tool.function_name().to_lowercase(), position))
            .collect();
        Self { tools, index }
    }

    pub fn get(&self, function_name: &str) -> Option<&ToolDefinition> {
        self.index
            .get(&function_name.to_lowercase())
            .map(|&position| &self.tools[position])
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(ToolDefinition::to_spec).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }
}

/// Retrieves every tool of the requested toolkits plus the individually
/// named tools, de-duplicated by qualified name and capped at `query.limit`.
pub async fn get_tools<C>(catalog: &C, query: &ToolQuery) -> Result<ToolSet, ToolServiceError>
where
    C: ToolCatalog + ?Sized,
{
    let mut seen = HashSet::new();
    let mut collected = Vec::new();

    for toolkit in &query.toolkits {
        let mut offset = 0;
        while collected.len() < query.limit {
            let page_size = PAGE_SIZE.min(query.limit - collected.len());
            let page = catalog
                .list_tools(toolkit, &query.user_id, page_size, offset)
                .await?;
            let received = page.items.len();
            debug!(toolkit = %toolkit, offset, received, "Fetched tool page");
            let before = collected.len();
            for tool in page.items {
                if seen.insert(tool.qualified_name.clone()) {
                    collected.push(tool);
                }
            }
            offset += received;
            let exhausted = page.total_count.map_or(received < page_size, |total| offset >= total);
            if received == 0 || exhausted {
                break;
            }
            if collected.len() == before {
                warn!(toolkit = %toolkit, offset, "Tool page added nothing new; stopping");
                break;
            }
        }
    }

    for name in &query.tools {
        if collected.len() >= query.limit {
            warn!(tool = %name, limit = query.limit, "Tool limit reached; skipping isolated tool");
            continue;
        }
        let tool = catalog.get_tool(name, &query.user_id).await?;
        if seen.insert(tool.qualified_name.clone()) {
            collected.push(tool);
        }
    }

    collected.truncate(query.limit);
    info!(count = collected.len(), "Retrieved tool definitions");
    Ok(ToolSet::new(collected))
}
