// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

use std::ops::Deref;

use tempfile::NamedTempFile;

use church_admin::app::AppState;
use church_admin::domain::org::OrgUnit;
use church_admin::domain::types::OrgLevel;
use church_admin::validation::OrgUnitForm;

use crate::test_helpers::create_test_db;

pub const ACTOR: &str = "tester";

/// API测试环境（临时数据库 + 完整 AppState）
pub struct ApiTestEnv {
    pub state: AppState,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl Deref for ApiTestEnv {
    type Target = AppState;

    fn deref(&self) -> &AppState {
        &self.state
    }
}

impl ApiTestEnv {
    pub fn new() -> Result<Self, String> {
        let (temp_file, db_path) =
            create_test_db().map_err(|e| format!("创建测试数据库失败: {}", e))?;
        let state = AppState::new(db_path)?;
        Ok(Self {
            state,
            _temp_file: temp_file,
        })
    }

    pub fn create_state(&self, name: &str) -> OrgUnit {
        self.org_api
            .create(OrgUnitForm::new(OrgLevel::State, name), ACTOR)
            .expect("创建州失败")
    }

    pub fn create_region(&self, state: &OrgUnit, name: &str) -> OrgUnit {
        self.org_api
            .create(
                OrgUnitForm::new(OrgLevel::Region, name).with_parent(OrgLevel::State, state.id),
                ACTOR,
            )
            .expect("创建大区失败")
    }

    pub fn create_group(&self, region: &OrgUnit, name: &str) -> OrgUnit {
        let state_id = region.state_id.expect("大区缺少州");
        self.org_api
            .create(
                OrgUnitForm::new(OrgLevel::Group, name)
                    .with_parent(OrgLevel::State, state_id)
                    .with_parent(OrgLevel::Region, region.id),
                ACTOR,
            )
            .expect("创建组失败")
    }

    /// 州 → 大区 → 组 三级
    pub fn create_hierarchy(&self) -> (OrgUnit, OrgUnit, OrgUnit) {
        let state = self.create_state("Lagos");
        let region = self.create_region(&state, "Ikeja");
        let group = self.create_group(&region, "Alpha");
        (state, region, group)
    }
}
