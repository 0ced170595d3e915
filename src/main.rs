// ==========================================
// 拣货批次系统 - 命令行入口
// ==========================================
// 用法:
//   picking-batch [--db <path>] run-rules [--rule <id>]...
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use picking_batch::app::{get_default_db_path, AppState};
use picking_batch::{logging, OperationContext};

/// 拣货批次规则执行工具
#[derive(Parser, Debug)]
#[command(name = "picking-batch", version, about = "Picking batch rule runner")]
struct Cli {
    /// 数据库文件路径（默认: PICKING_BATCH_DB_PATH 或用户数据目录）
    #[arg(long = "db")]
    db: Option<String>,

    /// 操作人（写入操作日志）
    #[arg(long = "actor", default_value = "cli")]
    actor: String,

    /// 新建批次所属公司
    #[arg(long = "company", default_value_t = 1)]
    company_id: i64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 执行批次规则并输出新建批次 id
    RunRules {
        /// 只执行指定规则（可重复）；缺省执行全部规则
        #[arg(long = "rule")]
        rule_ids: Vec<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("拣货批次系统 {} 使用数据库: {}", picking_batch::VERSION, db_path);

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;
    let ctx = OperationContext::new(cli.actor.clone(), cli.company_id);

    match cli.command {
        Command::RunRules { rule_ids } => {
            let view = if rule_ids.is_empty() {
                state.batch_api.run_all_rules(&ctx)
            } else {
                state.batch_api.action_batch_creation(&ctx, &rule_ids)
            }
            .context("批次规则执行失败")?;

            for id in &view.batch_ids {
                println!("{}", id);
            }
            tracing::info!(batch_count = view.batch_ids.len(), "完成");
        }
    }

    Ok(())
}
