//! # 单次完成约定
//!
//! 异步复制任务通过 `Promise` 回传结果：`resolve` / `reject` 都会消费自身，
//! 因此一个 `Promise` 最多完成一次。任务在完成前被丢弃（panic、运行时关闭）时，
//! `Drop` 以该方法的兜底错误码拒绝，保证调用方总能收到恰好一次结果。

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::CommandError;

use super::Operation;

type Completion<T> = Result<T, CommandError>;

/// 任务侧句柄。
pub struct Promise<T> {
    respond_to: Option<oneshot::Sender<Completion<T>>>,
    operation: Operation,
}

/// 调用侧句柄，可 `.await` 或阻塞等待。
pub struct PendingResult<T> {
    receiver: oneshot::Receiver<Completion<T>>,
    operation: Operation,
}

impl<T> Promise<T> {
    pub fn channel(operation: Operation) -> (Promise<T>, PendingResult<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            Promise {
                respond_to: Some(sender),
                operation,
            },
            PendingResult {
                receiver,
                operation,
            },
        )
    }

    pub fn resolve(self, value: T) {
        self.settle(Ok(value));
    }

    pub fn reject(self, error: CommandError) {
        self.settle(Err(error));
    }

    pub fn settle(mut self, result: Completion<T>) {
        if let Some(sender) = self.respond_to.take() {
            // 调用方已放弃等待时发送失败，结果无人接收即可丢弃
            let _ = sender.send(result);
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if let Some(sender) = self.respond_to.take() {
            log::error!("❌ {} 任务未返回结果即结束", self.operation.name());
            let _ = sender.send(Err(abandoned(self.operation)));
        }
    }
}

fn abandoned(operation: Operation) -> CommandError {
    CommandError::new(
        operation.fallback_code(),
        format!("{} 任务未返回结果即结束", operation.name()),
    )
}

impl<T> PendingResult<T> {
    /// 在非异步上下文中阻塞等待结果。不能在 tokio 运行时线程内调用。
    pub fn wait_blocking(self) -> Completion<T> {
        let operation = self.operation;
        self.receiver
            .blocking_recv()
            .unwrap_or_else(|_| Err(abandoned(operation)))
    }
}

impl<T> Future for PendingResult<T> {
    type Output = Completion<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let operation = self.operation;
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(abandoned(operation))),
            Poll::Pending => Poll::Pending,
        }
    }
}
