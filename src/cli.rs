//! 命令行参数
//!
//! 不带子命令时启动 HTTP 服务

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "invoice-dashboard-rust")]
#[command(version, about = "Invoice dashboard form actions over HTTP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum Command {
    /// 启动 HTTP 服务 (默认)
    Serve,
    /// 生成 users.password 列所需的 argon2 哈希
    HashPassword {
        /// 明文密码
        password: String,
    },
}
