// ==========================================
// 教会行政管理系统 - 命令行入口
// ==========================================
// 子命令: init / import / export / list / summary / create-admin
// 错误: anyhow 只在这一层使用
// ==========================================

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use church_admin::api::ApiError;
use church_admin::app::{get_default_db_path, AppState};
use church_admin::domain::types::{AccessLevel, OrgLevel, ServiceType};
use church_admin::logging::{self, LogFormat};
use church_admin::query::{ListQuery, SortDirection, SortState};
use church_admin::repository::AttendanceFilter;
use church_admin::validation::{AdminProfileForm, NewAdminForm};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "church-admin", version, about = "教会行政管理系统")]
struct Cli {
    /// 数据库文件（缺省取 CHURCH_ADMIN_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 以 JSON 输出日志
    #[arg(long, global = true)]
    json_log: bool,

    /// 操作人（写入操作日志）
    #[arg(long, global = true, default_value = "cli")]
    actor: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 创建数据库并建表
    Init,

    /// 导入组织单元表格（可多个文件）
    Import {
        #[arg(value_parser = parse_level)]
        level: OrgLevel,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// 导出为 CSV（层级名或 attendance）
    Export {
        target: String,
        file: PathBuf,
        /// 仅对 attendance 生效
        #[arg(long)]
        year: Option<i32>,
    },

    /// 列出某层级的组织单元
    List {
        #[arg(value_parser = parse_level)]
        level: OrgLevel,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// 年度出勤汇总
    Summary {
        #[arg(long)]
        year: i32,
        #[arg(long, value_parser = parse_service_type)]
        service: Option<ServiceType>,
    },

    /// 新建管理员
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_parser = parse_access_level, default_value = "SUPER_ADMIN")]
        access_level: AccessLevel,
        /// 权限范围单元 id（非 SUPER_ADMIN 必填）
        #[arg(long)]
        scope_id: Option<i64>,
    },
}

fn parse_level(value: &str) -> Result<OrgLevel, String> {
    OrgLevel::parse(value).ok_or_else(|| format!("未知层级: {}", value))
}

fn parse_service_type(value: &str) -> Result<ServiceType, String> {
    ServiceType::parse(value).ok_or_else(|| format!("未知聚会类型: {}", value))
}

fn parse_access_level(value: &str) -> Result<AccessLevel, String> {
    AccessLevel::parse(value).ok_or_else(|| format!("未知权限级别: {}", value))
}

fn api_err(err: ApiError) -> anyhow::Error {
    anyhow!(err.user_message())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path.clone()).map_err(|e| anyhow!(e))?;
    let actor = cli.actor.as_str();

    match cli.command {
        Command::Init => {
            println!("{} {}: {}", church_admin::APP_NAME, church_admin::VERSION, db_path);
        }

        Command::Import { level, files } => {
            let results = state.import_api.import_many(level, files, actor).await;
            for result in results {
                match result {
                    Ok(response) => {
                        println!("{}", response.message);
                        for error in &response.summary.errors {
                            println!("  row {}: {}", error.row, error.message);
                        }
                    }
                    Err(message) => eprintln!("{}", message),
                }
            }
        }

        Command::Export { target, file, year } => {
            let response = if target.eq_ignore_ascii_case("attendance") {
                let filter = AttendanceFilter {
                    year,
                    ..Default::default()
                };
                state.export_api.export_attendance(&filter, &file, actor)
            } else {
                let level = parse_level(&target).map_err(|e| anyhow!(e))?;
                state.export_api.export_org_units(level, &file, actor)
            }
            .map_err(api_err)?;
            println!("{}", response.message);
        }

        Command::List {
            level,
            search,
            sort,
            desc,
            page,
            page_size,
        } => {
            let mut query = ListQuery {
                page,
                page_size,
                ..Default::default()
            };
            if let Some(term) = search {
                query = query.with_search(&term);
            }
            if let Some(field) = sort {
                let direction = if desc { SortDirection::Desc } else { SortDirection::Asc };
                query = query.with_sort(SortState { field, direction });
            }

            let result = state.org_api.list(level, &query).map_err(api_err)?;
            for unit in &result.items {
                println!(
                    "{:>6}  {:<30} {:<10} {}",
                    unit.id,
                    unit.name,
                    unit.code.as_deref().unwrap_or("-"),
                    unit.leader.as_deref().unwrap_or("-")
                );
            }
            println!(
                "page {}/{} ({} total)",
                result.page, result.total_pages, result.total
            );
        }

        Command::Summary { year, service } => {
            let series = state
                .dashboard_api
                .monthly_totals(year, service)
                .map_err(api_err)?;
            for point in series {
                println!("{:>2}: {}", point.month, point.total);
            }
            for slice in state.dashboard_api.category_breakdown(year).map_err(api_err)? {
                println!("{:<15} {}", slice.category, slice.value);
            }
        }

        Command::CreateAdmin {
            name,
            email,
            password,
            access_level,
            scope_id,
        } => {
            let mut profile = AdminProfileForm {
                name,
                email,
                phone: None,
                access_level,
                state_id: None,
                region_id: None,
                group_id: None,
                district_id: None,
            };
            match access_level.scope_level() {
                Some(OrgLevel::State) => profile.state_id = scope_id,
                Some(OrgLevel::Region) => profile.region_id = scope_id,
                Some(OrgLevel::Group) => profile.group_id = scope_id,
                Some(OrgLevel::District) => profile.district_id = scope_id,
                _ => {}
            }
            let form = NewAdminForm {
                profile,
                confirm_password: password.clone(),
                password,
            };
            let admin = state.admin_api.create_admin(form, actor).map_err(api_err)?;
            println!("admin #{} {}", admin.id, admin.email);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_with_format(if cli.json_log {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    });

    if let Err(e) = run(cli).await.context("church-admin") {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
