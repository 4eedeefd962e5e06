// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use church_admin::config::ImportConfigReader;
use std::error::Error;

/// Mock 导入配置
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub max_rows: usize,
    pub update_existing: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            max_rows: 5000,
            update_existing: true,
        }
    }
}

impl MockConfig {
    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            max_rows,
            ..Self::default()
        }
    }

    pub fn no_update() -> Self {
        Self {
            update_existing: false,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_max_rows(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        Ok(self.max_rows)
    }

    async fn get_update_existing(&self) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Ok(self.update_existing)
    }
}
