// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides temp-dir environments and a builder for definition files

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs;

pub struct TestDefinitionBuilder {
    includes: Vec<String>,
    globals: Vec<(String, String)>,
    templates: Vec<TestTemplate>,
}

pub struct TestTemplate {
    pub src: String,
    pub dest: String,
    pub local_vars: Vec<(String, String)>,
    pub include_vars: Vec<String>,
}

impl TestTemplate {
    pub fn new(src: &str, dest: &str) -> Self {
        Self {
            src: src.to_string(),
            dest: dest.to_string(),
            local_vars: Vec::new(),
            include_vars: Vec::new(),
        }
    }

    pub fn with_local(mut self, key: &str, value: &str) -> Self {
        self.local_vars.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_include(mut self, path: &str) -> Self {
        self.include_vars.push(path.to_string());
        self
    }
}

impl TestDefinitionBuilder {
    pub fn new() -> Self {
        Self {
            includes: Vec::new(),
            globals: Vec::new(),
            templates: Vec::new(),
        }
    }

    pub fn with_global(mut self, key: &str, value: &str) -> Self {
        self.globals.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_include(mut self, path: &str) -> Self {
        self.includes.push(path.to_string());
        self
    }

    pub fn with_template(mut self, template: TestTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn add_template(self, src: &str, dest: &str) -> Self {
        self.with_template(TestTemplate::new(src, dest))
    }

    pub fn generate_toml(&self) -> String {
        let mut toml = String::new();

        toml.push_str("[vars]\n");
        toml.push_str(&format!("include = {}\n", string_array(&self.includes)));
        toml.push_str("\n[vars.global]\n");
        for (key, value) in &self.globals {
            toml.push_str(&format!("{} = {:?}\n", key, value));
        }

        for template in &self.templates {
            toml.push_str("\n[[templates]]\n");
            toml.push_str(&format!("src = {:?}\n", template.src));
            toml.push_str(&format!("dest = {:?}\n", template.dest));
            toml.push_str(&format!(
                "include_vars = {}\n",
                string_array(&template.include_vars)
            ));

            if !template.local_vars.is_empty() {
                toml.push_str("\n[templates.local_vars]\n");
                for (key, value) in &template.local_vars {
                    toml.push_str(&format!("{} = {:?}\n", key, value));
                }
            }
        }

        toml
    }
}

fn string_array(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("{:?}", i)).collect();
    format!("[{}]", quoted.join(", "))
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub async fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .expect("Failed to create parent directory");
        }
        fs::write(&path, content)
            .await
            .expect("Failed to write test file");
        path
    }

    pub async fn write_vars_file(&self, relative: &str, pairs: &[(&str, &str)]) -> PathBuf {
        let mut content = String::from("[vars]\n");
        for (key, value) in pairs {
            content.push_str(&format!("{} = {:?}\n", key, value));
        }
        self.write_file(relative, &content).await
    }

    pub async fn create_definition_file(
        &self,
        name: &str,
        builder: &TestDefinitionBuilder,
    ) -> PathBuf {
        self.write_file(name, &builder.generate_toml()).await
    }

    pub async fn read_file(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative))
            .await
            .expect("Failed to read output file")
    }
}
