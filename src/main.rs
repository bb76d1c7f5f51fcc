// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 路由诊断控制台
//!
//! 加载路由配置并在标准输入上提供交互式指令，用于在部署前核对路由表：
//! - `match <uri>`：解析请求路径，以 JSON 输出匹配结果
//! - `link <name> [k=v ...]`：按路由名生成链接
//! - `routes`：列出全部路由
//! - `help` / `stop`

use std::io::{self, BufRead};
use std::process;

use log::{error, info, warn, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};

use nocturne_links::{Config, ParamValue, ParameterMap, RouteTable};

const LOG_CONFIG: &str = "config/log4rs.yaml";
const DEFAULT_ROUTES: &str = "config/routes.toml";

fn main() {
    // 1. 初始化日志系统：优先读取外部 YAML，缺失时退回到控制台输出
    if let Err(e) = log4rs::init_file(LOG_CONFIG, Default::default()) {
        init_console_logger();
        warn!("无法载入{}：{}，使用默认控制台日志", LOG_CONFIG, e);
    }

    // 2. 载入路由配置并构建路由表
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ROUTES.to_string());
    let config = match Config::from_toml(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    info!("配置文件{}已载入", config_path);

    let table = match RouteTable::from_config(&config) {
        Ok(table) => table,
        Err(e) => {
            error!("路由表构建失败：{}", e);
            process::exit(1);
        }
    };
    info!(
        "路由表构建完成，共{}个页面，上下文路径\"{}\"",
        table.routes().len(),
        table.context_path()
    );

    // 3. 交互式指令循环
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let input = match line {
            Ok(input) => input,
            Err(e) => {
                error!("读取标准输入失败：{}", e);
                break;
            }
        };
        let mut words = input.split_whitespace();
        match words.next() {
            Some("stop") => {
                println!("控制台已退出");
                break;
            }
            Some("help") => print_help(),
            Some("routes") => {
                for route in table.routes() {
                    println!("{:<24} {:<32} {:?}", route.name, route.page, route.patterns);
                }
            }
            Some("match") => match words.next() {
                Some(uri) => run_match(&table, uri),
                None => println!("用法：match <uri>"),
            },
            Some("link") => match words.next() {
                Some(name) => run_link(&table, name, words),
                None => println!("用法：link <name> [k=v ...]"),
            },
            Some(cmd) => println!("无效的命令：{}", cmd),
            None => {}
        }
    }
}

fn init_console_logger() {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%Y-%m-%d %H:%M:%S)} {h({l})} {m}{n}")))
        .build();
    let config = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));
    match config {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                eprintln!("无法初始化日志系统：{}", e);
            }
        }
        Err(e) => eprintln!("日志配置无效：{}", e),
    }
}

fn print_help() {
    println!("== Links Console Help ==");
    println!("match <uri>            - 解析请求路径");
    println!("link <name> [k=v ...]  - 按路由名生成链接");
    println!("routes                 - 列出全部路由");
    println!("help                   - 显示此帮助信息");
    println!("stop                   - 退出");
    println!("========================");
}

fn run_match(table: &RouteTable, uri: &str) {
    match table.match_uri(uri) {
        Ok(Some(result)) => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("无法序列化匹配结果：{}", e),
        },
        Ok(None) => println!("null (404)"),
        Err(e) => println!("{}", e),
    }
}

fn run_link<'a>(table: &RouteTable, name: &str, args: impl Iterator<Item = &'a str>) {
    let params = match parse_assignments(args) {
        Ok(params) => params,
        Err(msg) => {
            println!("{}", msg);
            return;
        }
    };
    match table.link_named(name, &params) {
        Ok(link) => println!("{}", link),
        Err(e) => println!("{}", e),
    }
}

// 同名参数多次出现时合并为多值
fn parse_assignments<'a>(args: impl Iterator<Item = &'a str>) -> Result<ParameterMap, String> {
    let mut params = ParameterMap::new();
    for arg in args {
        let (key, value) = match arg.split_once('=') {
            Some(kv) => kv,
            None => return Err(format!("参数应为k=v形式：{}", arg)),
        };
        let merged = match params.get(key) {
            Some(ParamValue::Single(prev)) => {
                ParamValue::Multi(vec![prev.clone(), value.to_string()])
            }
            Some(ParamValue::Multi(prev)) => {
                let mut all = prev.clone();
                all.push(value.to_string());
                ParamValue::Multi(all)
            }
            _ => ParamValue::from(value),
        };
        params.insert(key, merged);
    }
    Ok(params)
}
