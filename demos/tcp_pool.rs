//! Pooling TCP connections to a local listener, with a background sweeper

use chanpool::{BoxError, Pool, PoolConfiguration};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

fn spawn_echo_server() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?.to_string();

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || {
                let mut stream = stream;
                let mut buf = [0u8; 512];
                while let Ok(n) = stream.read(&mut buf) {
                    if n == 0 || stream.write_all(&buf[..n]).is_err() {
                        break;
                    }
                }
            });
        }
    });

    Ok(addr)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt().with_env_filter("chanpool=debug").init();

    let addr = spawn_echo_server()?;
    println!("=== chanpool - TCP Pool ({}) ===\n", addr);

    let config = PoolConfiguration::new()
        .with_initial_cap(2)
        .with_max_cap(8)
        .with_factory(move || Ok(TcpStream::connect(&addr)?))
        .with_close(|stream: TcpStream| Ok(stream.shutdown(Shutdown::Both)?))
        .with_ping(|stream| {
            stream.peer_addr()?;
            Ok(())
        })
        .with_idle_timeout(Duration::from_millis(200));

    let pool = Pool::new(config)?;
    let sweeper = pool.spawn_sweeper(Duration::from_millis(50))?;

    let mut workers = Vec::new();
    for worker in 0..4 {
        let pool = pool.clone();
        workers.push(tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
            let mut conn = pool.get_guard()?;
            let message = format!("hello from worker {}", worker);
            conn.write_all(message.as_bytes())?;

            let mut buf = vec![0u8; message.len()];
            conn.read_exact(&mut buf)?;
            println!("   worker {} got echo: {}", worker, String::from_utf8_lossy(&buf));
            Ok(())
        }));
    }
    for worker in workers {
        worker.await??;
    }

    println!("\n   idle: {}, remain: {}", pool.len(), pool.remain());
    tokio::time::sleep(Duration::from_millis(400)).await;
    println!("   idle after sweep: {}, remain: {}", pool.len(), pool.remain());

    pool.release();
    sweeper.await?;
    Ok(())
}
