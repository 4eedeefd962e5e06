// ==========================================
// 教会行政管理系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 单个文件允许的最大数据行数
    ///
    /// # 默认值
    /// - 5000
    async fn get_max_rows(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// 名称/编码已存在时是否更新
    ///
    /// # 返回
    /// - true: 更新已有单位
    /// - false: 跳过并记为行错误
    ///
    /// # 默认值
    /// - true
    async fn get_update_existing(&self) -> Result<bool, Box<dyn Error + Send + Sync>>;
}
