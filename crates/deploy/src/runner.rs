//! Tag-based selection and sequential execution of deployment scripts.

use tracing::{info, warn};

use crate::{DeployEnvironment, DeployError, DeployScript, Deployment, Result};

/// Runs deployment scripts selected by tag.
#[derive(Debug)]
pub struct DeployRunner {
    scripts: Vec<Box<dyn DeployScript>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

impl DeployRunner {
    /// Creates a runner; scripts are ordered by id.
    pub fn new(mut scripts: Vec<Box<dyn DeployScript>>) -> Self {
        scripts.sort_by_key(|script| script.id());
        Self { scripts }
    }

    /// Returns the scripts in execution order.
    pub fn scripts(&self) -> &[Box<dyn DeployScript>] {
        &self.scripts
    }

    /// Returns the scripts that would run for `tags`, dependencies first.
    ///
    /// An empty tag list selects every script.
    pub fn plan(&self, tags: &[String]) -> Result<Vec<&dyn DeployScript>> {
        let selected: Vec<usize> = (0..self.scripts.len())
            .filter(|&i| {
                tags.is_empty()
                    || self.scripts[i].tags().iter().any(|tag| tags.iter().any(|t| t == tag))
            })
            .collect();

        if selected.is_empty() && !tags.is_empty() {
            warn!(target: "deploy", ?tags, "No deployment scripts match the requested tags");
        }

        let mut marks = vec![Mark::Unvisited; self.scripts.len()];
        let mut order = Vec::with_capacity(self.scripts.len());
        for index in selected {
            self.visit(index, &mut marks, &mut order)?;
        }
        Ok(order.into_iter().map(|i| self.scripts[i].as_ref()).collect())
    }

    fn visit(&self, index: usize, marks: &mut [Mark], order: &mut Vec<usize>) -> Result<()> {
        match marks[index] {
            Mark::Done => return Ok(()),
            Mark::Visiting => {
                return Err(DeployError::DependencyCycle(self.scripts[index].id().to_string()));
            }
            Mark::Unvisited => {}
        }
        marks[index] = Mark::Visiting;

        let script = &self.scripts[index];
        for tag in script.dependencies() {
            // A script already provides its own tags.
            if script.tags().contains(tag) {
                continue;
            }
            let providers: Vec<usize> = (0..self.scripts.len())
                .filter(|&i| self.scripts[i].tags().contains(tag))
                .collect();
            if providers.is_empty() {
                return Err(DeployError::MissingDependency {
                    script: script.id().to_string(),
                    tag: (*tag).to_string(),
                });
            }
            for provider in providers {
                self.visit(provider, marks, order)?;
            }
        }

        marks[index] = Mark::Done;
        order.push(index);
        Ok(())
    }

    /// Runs the scripts selected by `tags`, stopping at the first failure.
    pub async fn run(
        &self,
        env: &dyn DeployEnvironment,
        tags: &[String],
    ) -> Result<Vec<(&'static str, Deployment)>> {
        let plan = self.plan(tags)?;
        info!(target: "deploy", scripts = plan.len(), "Running deployment scripts");

        let mut deployments = Vec::with_capacity(plan.len());
        for script in plan {
            info!(target: "deploy", id = script.id(), "Executing deployment script");
            let deployment = script.run(env).await?;
            deployments.push((script.id(), deployment));
        }
        Ok(deployments)
    }
}
