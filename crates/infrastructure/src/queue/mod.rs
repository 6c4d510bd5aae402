mod rabbitmq_work_queue;

pub use rabbitmq_work_queue::RabbitMqWorkQueue;
