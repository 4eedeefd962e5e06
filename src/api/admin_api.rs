// ==========================================
// 教会行政管理系统 - 管理员 API
// ==========================================
// 职责: 管理员档案、密码修改、登录验证、启用/停用
// 红线: 密码摘要与盐不出仓储层；日志中不记录密码
// ==========================================

use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::support::{record_action, resolve_page_size};
use crate::config::ConfigManager;
use crate::domain::action_log::{entity, ActionType};
use crate::domain::admin::{AdminProfile, PasswordDigest};
use crate::i18n::{t, t_with_args};
use crate::query::{ListQuery, Page};
use crate::repository::{ActionLogRepository, AdminRepository, RepositoryError};
use crate::validation::{
    AdminProfileForm, ChangePasswordForm, LoginForm, NewAdminForm, PasswordPolicy, Validate,
};

pub struct AdminApi {
    admin_repo: Arc<AdminRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config: Arc<ConfigManager>,
}

impl AdminApi {
    pub fn new(
        admin_repo: Arc<AdminRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            admin_repo,
            action_log_repo,
            config,
        }
    }

    fn password_policy(&self) -> ApiResult<PasswordPolicy> {
        let min_length = self
            .config
            .get_password_min_length()
            .map_err(|e| ApiError::InternalError(format!("配置读取失败: {}", e)))?;
        Ok(PasswordPolicy::new(min_length))
    }

    /// 邮箱已被其他管理员占用
    fn ensure_email_free(&self, email: &str, except_id: Option<i64>) -> ApiResult<()> {
        if let Some(other) = self.admin_repo.find_by_email(email)? {
            if Some(other.id) != except_id {
                return Err(ApiError::BusinessRuleViolation(t_with_args(
                    "admin.email_taken",
                    &[("email", email)],
                )));
            }
        }
        Ok(())
    }

    // ==========================================
    // 档案
    // ==========================================

    #[instrument(skip(self, form))]
    pub fn create_admin(&self, form: NewAdminForm, actor: &str) -> ApiResult<AdminProfile> {
        let policy = self.password_policy()?;
        form.validate_with_policy(&policy).into_result()?;

        let details = form.profile.into_details()?;
        self.ensure_email_free(&details.email, None)?;

        let digest = PasswordDigest::generate(&form.password);
        let id = self.admin_repo.insert(&details, &digest)?;
        record_action(
            &self.action_log_repo,
            ActionType::Create,
            actor,
            entity::ADMIN,
            Some(id),
            serde_json::to_value(&details).ok(),
            None,
        )?;
        info!(id = id, access_level = %details.access_level, "管理员已创建");
        self.get_profile(id)
    }

    pub fn get_profile(&self, id: i64) -> ApiResult<AdminProfile> {
        self.admin_repo
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::not_found("AdminProfile", id).into())
    }

    #[instrument(skip(self, form))]
    pub fn update_profile(&self, id: i64, form: AdminProfileForm, actor: &str) -> ApiResult<AdminProfile> {
        let details = form.into_details()?;
        self.get_profile(id)?;
        self.ensure_email_free(&details.email, Some(id))?;

        self.admin_repo.update_details(id, &details)?;
        record_action(
            &self.action_log_repo,
            ActionType::Update,
            actor,
            entity::ADMIN,
            Some(id),
            serde_json::to_value(&details).ok(),
            None,
        )?;
        self.get_profile(id)
    }

    pub fn list_admins(&self, query: &ListQuery) -> ApiResult<Page<AdminProfile>> {
        let page_size = resolve_page_size(&self.config, query.page_size)?;
        Ok(query.run(self.admin_repo.list_all()?, page_size))
    }

    pub fn set_active(&self, id: i64, active: bool, actor: &str) -> ApiResult<AdminProfile> {
        self.admin_repo.set_active(id, active)?;
        record_action(
            &self.action_log_repo,
            ActionType::Update,
            actor,
            entity::ADMIN,
            Some(id),
            Some(json!({ "is_active": active })),
            None,
        )?;
        info!(id = id, active = active, "管理员状态已变更");
        self.get_profile(id)
    }

    pub fn delete_admin(&self, id: i64, actor: &str) -> ApiResult<()> {
        self.admin_repo.delete(id)?;
        record_action(
            &self.action_log_repo,
            ActionType::Delete,
            actor,
            entity::ADMIN,
            Some(id),
            None,
            None,
        )?;
        info!(id = id, "管理员已删除");
        Ok(())
    }

    // ==========================================
    // 密码与登录
    // ==========================================

    #[instrument(skip(self, form))]
    pub fn change_password(&self, id: i64, form: ChangePasswordForm, actor: &str) -> ApiResult<()> {
        let policy = self.password_policy()?;
        form.validate_with_policy(&policy).into_result()?;

        let digest = self
            .admin_repo
            .find_digest(id)?
            .ok_or_else(|| ApiError::from(RepositoryError::not_found("AdminProfile", id)))?;
        if !digest.verify(&form.current_password) {
            warn!(id = id, "原密码校验失败");
            return Err(ApiError::Unauthorized(t("admin.wrong_password")));
        }

        self.admin_repo
            .update_password(id, &PasswordDigest::generate(&form.new_password))?;
        record_action(
            &self.action_log_repo,
            ActionType::ChangePassword,
            actor,
            entity::ADMIN,
            Some(id),
            None,
            None,
        )?;
        info!(id = id, "密码已修改");
        Ok(())
    }

    /// 登录验证
    ///
    /// # 返回
    /// - Ok(AdminProfile): 已更新 last_login_at 的档案
    /// - Err(ApiError::Unauthorized): 邮箱/密码错误或账号停用
    #[instrument(skip(self, form))]
    pub fn authenticate(&self, form: LoginForm) -> ApiResult<AdminProfile> {
        form.validate().into_result()?;

        let Some((profile, digest)) = self.admin_repo.find_credentials_by_email(&form.email)? else {
            warn!("登录失败: 邮箱不存在");
            return Err(ApiError::Unauthorized(t("admin.invalid_credentials")));
        };
        if !digest.verify(&form.password) {
            warn!(id = profile.id, "登录失败: 密码错误");
            return Err(ApiError::Unauthorized(t("admin.invalid_credentials")));
        }
        if !profile.is_active {
            warn!(id = profile.id, "登录失败: 账号已停用");
            return Err(ApiError::Unauthorized(t("admin.inactive")));
        }

        self.admin_repo.touch_last_login(profile.id)?;
        record_action(
            &self.action_log_repo,
            ActionType::Login,
            &profile.email,
            entity::ADMIN,
            Some(profile.id),
            None,
            None,
        )?;
        info!(id = profile.id, "登录成功");
        self.get_profile(profile.id)
    }
}
